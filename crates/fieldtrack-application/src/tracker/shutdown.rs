//! Process-level shutdown signal.
//!
//! Every tracker failure path is terminal: the tracker requests
//! shutdown and the hosting process must exit without automatic
//! restart. There is no retry and no partial-tracking state.

use std::sync::Mutex;

use strum::Display;
use tokio_util::sync::CancellationToken;

/// Why the tracker asked the host to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShutdownReason {
    PermissionDenied,
    NoProviderAvailable,
    RegistrationFailure,
    /// An explicit stop command was received.
    StopRequested,
}

impl ShutdownReason {
    /// All current reasons carry a do-not-restart disposition.
    pub fn allows_restart(&self) -> bool {
        false
    }
}

/// One-shot shutdown request shared between the tracker and its host.
#[derive(Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
    reason: Mutex<Option<ShutdownReason>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. The first reason wins; later requests only
    /// re-cancel the token.
    pub fn request(&self, reason: ShutdownReason) {
        {
            let mut slot = self.reason.lock().unwrap();
            if slot.is_none() {
                *slot = Some(reason);
            }
        }
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.reason.lock().unwrap()
    }

    /// Completes when shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }

    /// Token for hosts that integrate with wider cancellation trees.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display_is_snake_case() {
        assert_eq!(
            ShutdownReason::PermissionDenied.to_string(),
            "permission_denied"
        );
        assert_eq!(ShutdownReason::StopRequested.to_string(), "stop_requested");
    }

    #[test]
    fn test_first_reason_wins() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_requested());
        assert_eq!(shutdown.reason(), None);

        shutdown.request(ShutdownReason::PermissionDenied);
        shutdown.request(ShutdownReason::StopRequested);

        assert!(shutdown.is_requested());
        assert_eq!(shutdown.reason(), Some(ShutdownReason::PermissionDenied));
    }

    #[tokio::test]
    async fn test_requested_completes_after_request() {
        let shutdown = Shutdown::new();
        shutdown.request(ShutdownReason::StopRequested);
        shutdown.requested().await;
        assert!(!ShutdownReason::StopRequested.allows_restart());
    }
}
