//! Location provider implementations.
//!
//! Neither talks to real positioning hardware: `SimulatedProvider` is
//! fed programmatically (tests, demos), `ReplayProvider` replays fixes
//! recorded in a TOML fixture file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::task::JoinHandle;

use fieldtrack_core::FieldtrackError;
use fieldtrack_core::error::Result;
use fieldtrack_core::position::Position;
use fieldtrack_core::provider::{
    LocationProvider, PositionFeed, ProviderKind, Registration, UpdateRequest,
};

/// A provider fed through [`SimulatedProvider::emit`].
///
/// Enabled state can be toggled at runtime to exercise provider
/// fallback paths.
pub struct SimulatedProvider {
    kind: ProviderKind,
    enabled: AtomicBool,
    next_id: AtomicU64,
    feeds: Mutex<Vec<(u64, PositionFeed)>>,
}

impl SimulatedProvider {
    pub fn new(kind: ProviderKind, enabled: bool) -> Self {
        Self {
            kind,
            enabled: AtomicBool::new(enabled),
            next_id: AtomicU64::new(1),
            feeds: Mutex::new(Vec::new()),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Delivers a position to every live registration.
    ///
    /// Returns the number of registrations the fix was delivered to.
    pub fn emit(&self, position: Position) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|(_, feed)| feed.send((self.kind, position)).is_ok());
        feeds.len()
    }

    /// Number of live registrations.
    pub fn registration_count(&self) -> usize {
        self.feeds.lock().unwrap().len()
    }
}

#[async_trait]
impl LocationProvider for SimulatedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn request_updates(
        &self,
        _request: UpdateRequest,
        feed: PositionFeed,
    ) -> Result<Registration> {
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(FieldtrackError::registration(
                self.kind.to_string(),
                "provider disabled",
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.feeds.lock().unwrap().push((id, feed));

        Ok(Registration {
            id,
            provider: self.kind,
        })
    }

    async fn remove_updates(&self, registration: Registration) -> Result<()> {
        let mut feeds = self.feeds.lock().unwrap();
        let before = feeds.len();
        feeds.retain(|(id, _)| *id != registration.id);

        if feeds.len() == before {
            return Err(FieldtrackError::internal(format!(
                "unknown registration {} on provider '{}'",
                registration.id, self.kind
            )));
        }
        Ok(())
    }
}

/// One recorded fix in a replay fixture.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReplayFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_accuracy_m")]
    pub accuracy_m: f32,
    /// Epoch ms; stamped at replay time when absent.
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
}

fn default_accuracy_m() -> f32 {
    15.0
}

/// Accuracy bound for the first report when the request asks to wait
/// for an accurate fix.
const ACCURATE_FIX_M: f32 = 25.0;

/// Fixture file layout: a list of `[[fix]]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayFixture {
    #[serde(default)]
    pub fix: Vec<ReplayFix>,
}

/// A provider that replays recorded fixes on a fixed cadence.
///
/// The cadence defaults to the request's desired interval; hosts
/// replaying fixtures interactively override it via
/// [`ReplayProvider::with_cadence`]. When the request asks to wait for
/// an accurate fix, reports are held back until one lands within
/// [`ACCURATE_FIX_M`].
pub struct ReplayProvider {
    kind: ProviderKind,
    enabled: bool,
    fixes: Vec<ReplayFix>,
    cadence: Option<Duration>,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl ReplayProvider {
    pub fn new(kind: ProviderKind, fixes: Vec<ReplayFix>) -> Self {
        Self {
            kind,
            enabled: true,
            fixes,
            cadence: None,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a
    /// Serialization error if it is not a valid fixture.
    pub fn from_path(kind: ProviderKind, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture: ReplayFixture = toml::from_str(&content)?;
        Ok(Self::new(kind, fixture.fix))
    }

    /// Overrides the replay cadence.
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn fix_count(&self) -> usize {
        self.fixes.len()
    }
}

impl Drop for ReplayProvider {
    fn drop(&mut self) {
        for (_, task) in self.tasks.lock().unwrap().drain() {
            task.abort();
        }
    }
}

#[async_trait]
impl LocationProvider for ReplayProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn request_updates(
        &self,
        request: UpdateRequest,
        feed: PositionFeed,
    ) -> Result<Registration> {
        let cadence = self
            .cadence
            .unwrap_or_else(|| Duration::from_millis(request.interval_ms));
        let kind = self.kind;
        let fixes = self.fixes.clone();

        let task = tokio::spawn(async move {
            let mut held_back = request.wait_for_accurate;
            for fix in fixes {
                tokio::time::sleep(cadence).await;
                if held_back && fix.accuracy_m > ACCURATE_FIX_M {
                    tracing::trace!(provider = %kind, accuracy_m = fix.accuracy_m, "Holding inaccurate first fix");
                    continue;
                }
                held_back = false;
                let position = Position::new(
                    fix.latitude,
                    fix.longitude,
                    fix.accuracy_m,
                    fix.timestamp_ms
                        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
                );
                if feed.send((kind, position)).is_err() {
                    break;
                }
            }
            tracing::debug!(provider = %kind, "Replay fixture exhausted");
        });

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().unwrap().insert(id, task);

        Ok(Registration {
            id,
            provider: self.kind,
        })
    }

    async fn remove_updates(&self, registration: Registration) -> Result<()> {
        match self.tasks.lock().unwrap().remove(&registration.id) {
            Some(task) => {
                task.abort();
                Ok(())
            }
            None => Err(FieldtrackError::internal(format!(
                "unknown registration {} on provider '{}'",
                registration.id, self.kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn fix(latitude: f64) -> Position {
        Position::new(latitude, 139.0, 10.0, 1_700_000_000_000)
    }

    #[tokio::test]
    async fn test_simulated_provider_delivers_to_registration() {
        let provider = SimulatedProvider::new(ProviderKind::Satellite, true);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let registration = provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap();
        assert_eq!(registration.provider, ProviderKind::Satellite);

        assert_eq!(provider.emit(fix(35.0)), 1);
        let (kind, position) = rx.recv().await.unwrap();
        assert_eq!(kind, ProviderKind::Satellite);
        assert_eq!(position.latitude, 35.0);
    }

    #[tokio::test]
    async fn test_simulated_provider_rejects_when_disabled() {
        let provider = SimulatedProvider::new(ProviderKind::Network, false);
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, FieldtrackError::Registration { .. }));
    }

    #[tokio::test]
    async fn test_simulated_provider_removal_stops_delivery() {
        let provider = SimulatedProvider::new(ProviderKind::Satellite, true);
        let (tx, _rx) = mpsc::unbounded_channel();

        let registration = provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap();
        provider.remove_updates(registration).await.unwrap();

        assert_eq!(provider.registration_count(), 0);
        assert_eq!(provider.emit(fix(35.0)), 0);

        // Removing twice reports the dangling handle.
        assert!(provider.remove_updates(registration).await.is_err());
    }

    #[tokio::test]
    async fn test_replay_provider_replays_fixture_in_order() {
        let fixture = r#"
            [[fix]]
            latitude = 35.0
            longitude = 139.0

            [[fix]]
            latitude = 36.0
            longitude = 140.0
            accuracy_m = 5.0
            timestamp_ms = 1700000000000
        "#;
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("walk.toml");
        std::fs::write(&path, fixture).unwrap();

        let provider = ReplayProvider::from_path(ProviderKind::Satellite, &path)
            .unwrap()
            .with_cadence(Duration::from_millis(1));
        assert_eq!(provider.fix_count(), 2);

        let (tx, mut rx) = mpsc::unbounded_channel();
        provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap();

        let (_, first) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let (_, second) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.latitude, 35.0);
        assert_eq!(second.latitude, 36.0);
        assert_eq!(second.accuracy_m, 5.0);
        assert_eq!(second.timestamp_ms, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_replay_holds_first_report_until_accurate() {
        let fixes = vec![
            ReplayFix {
                latitude: 35.0,
                longitude: 139.0,
                accuracy_m: 80.0,
                timestamp_ms: None,
            },
            ReplayFix {
                latitude: 36.0,
                longitude: 140.0,
                accuracy_m: 10.0,
                timestamp_ms: None,
            },
            ReplayFix {
                latitude: 37.0,
                longitude: 141.0,
                accuracy_m: 90.0,
                timestamp_ms: None,
            },
        ];
        let provider = ReplayProvider::new(ProviderKind::Satellite, fixes)
            .with_cadence(Duration::from_millis(1));

        let (tx, mut rx) = mpsc::unbounded_channel();
        provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap();

        // The inaccurate leading fix is withheld; once an accurate fix
        // lands, subsequent fixes flow regardless of accuracy.
        let (_, first) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let (_, second) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.latitude, 36.0);
        assert_eq!(second.latitude, 37.0);
    }

    #[tokio::test]
    async fn test_replay_cadence_defaults_to_request_interval() {
        let fixes = vec![ReplayFix {
            latitude: 35.0,
            longitude: 139.0,
            accuracy_m: 10.0,
            timestamp_ms: None,
        }];
        let provider = ReplayProvider::new(ProviderKind::Network, fixes);

        let request = UpdateRequest {
            interval_ms: 1,
            ..UpdateRequest::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        provider.request_updates(request, tx).await.unwrap();

        let (_, position) = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(position.latitude, 35.0);
    }

    #[tokio::test]
    async fn test_replay_provider_removal_aborts_replay() {
        let fixes = vec![
            ReplayFix {
                latitude: 35.0,
                longitude: 139.0,
                accuracy_m: 10.0,
                timestamp_ms: None,
            };
            100
        ];
        let provider =
            ReplayProvider::new(ProviderKind::Network, fixes).with_cadence(Duration::from_secs(60));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let registration = provider
            .request_updates(UpdateRequest::default(), tx)
            .await
            .unwrap();
        provider.remove_updates(registration).await.unwrap();

        // The feed closes once the aborted task drops its sender.
        assert!(
            timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .is_none()
        );
    }
}
