//! Location provider seam.
//!
//! A provider is a source of position fixes (satellite-based,
//! network-based) with independent availability and accuracy
//! characteristics. The tracker owns provider selection; providers only
//! register and deregister update requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::position::Position;

/// Default minimum desired interval between updates.
pub const DEFAULT_INTERVAL_MS: u64 = 30_000;
/// Default fastest interval a provider may deliver at.
pub const DEFAULT_FASTEST_INTERVAL_MS: u64 = 15_000;
/// Default minimum movement between reports.
pub const DEFAULT_MIN_DISPLACEMENT_M: f32 = 10.0;

/// Kinds of position sources, in descending accuracy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    /// Satellite positioning, highest accuracy.
    Satellite,
    /// Network-based positioning, the fallback source.
    Network,
}

impl ProviderKind {
    /// Selection order: most accurate provider first.
    pub const PREFERENCE: [ProviderKind; 2] = [ProviderKind::Satellite, ProviderKind::Network];
}

/// Tunables for a periodic update request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Minimum desired interval between updates, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Fastest interval a provider may deliver at, in milliseconds.
    #[serde(default = "default_fastest_interval_ms")]
    pub fastest_interval_ms: u64,
    /// Minimum movement between reports, in meters.
    #[serde(default = "default_min_displacement_m")]
    pub min_displacement_m: f32,
    /// Hold the first report until the provider has an accurate fix.
    #[serde(default = "default_wait_for_accurate")]
    pub wait_for_accurate: bool,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_fastest_interval_ms() -> u64 {
    DEFAULT_FASTEST_INTERVAL_MS
}

fn default_min_displacement_m() -> f32 {
    DEFAULT_MIN_DISPLACEMENT_M
}

fn default_wait_for_accurate() -> bool {
    true
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            fastest_interval_ms: DEFAULT_FASTEST_INTERVAL_MS,
            min_displacement_m: DEFAULT_MIN_DISPLACEMENT_M,
            wait_for_accurate: true,
        }
    }
}

/// Sending half handed to a provider on registration; delivered fixes
/// flow back to the tracking lifecycle owner through it.
pub type PositionFeed = mpsc::UnboundedSender<(ProviderKind, Position)>;

/// Receiving half owned by the lifecycle owner.
pub type PositionFeedReceiver = mpsc::UnboundedReceiver<(ProviderKind, Position)>;

/// Handle for a live update registration, used for deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Registration {
    pub id: u64,
    pub provider: ProviderKind,
}

/// A source of position fixes.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// The kind of fixes this provider produces.
    fn kind(&self) -> ProviderKind;

    /// Whether the provider is currently enabled on the platform.
    async fn is_enabled(&self) -> bool;

    /// Registers a periodic update request. Fixes are pushed into
    /// `feed` until the registration is removed.
    ///
    /// The request tunables are advisory: a provider honors the ones it
    /// can express. Sources without native displacement filtering may
    /// ignore `min_displacement_m`; sources without adaptive pacing may
    /// ignore `fastest_interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns a `Registration` error if the platform rejects the
    /// request.
    async fn request_updates(&self, request: UpdateRequest, feed: PositionFeed)
    -> Result<Registration>;

    /// Removes a previously created registration.
    async fn remove_updates(&self, registration: Registration) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_defaults() {
        let request = UpdateRequest::default();
        assert_eq!(request.interval_ms, 30_000);
        assert_eq!(request.fastest_interval_ms, 15_000);
        assert_eq!(request.min_displacement_m, 10.0);
        assert!(request.wait_for_accurate);
    }

    #[test]
    fn test_update_request_fills_missing_fields_from_toml() {
        let request: UpdateRequest = toml::from_str("interval_ms = 60000").unwrap();
        assert_eq!(request.interval_ms, 60_000);
        assert_eq!(request.fastest_interval_ms, 15_000);
        assert_eq!(request.min_displacement_m, 10.0);
    }

    #[test]
    fn test_provider_kind_round_trips_as_string() {
        assert_eq!(ProviderKind::Satellite.to_string(), "satellite");
        assert_eq!(
            "network".parse::<ProviderKind>().unwrap(),
            ProviderKind::Network
        );
    }

    #[test]
    fn test_preference_orders_satellite_first() {
        assert_eq!(ProviderKind::PREFERENCE[0], ProviderKind::Satellite);
        assert_eq!(ProviderKind::PREFERENCE[1], ProviderKind::Network);
    }
}
