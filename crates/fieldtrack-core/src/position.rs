//! Position fix model and the outbound broadcast payload.

use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// A single position fix delivered by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated horizontal accuracy radius in meters.
    pub accuracy_m: f32,
    /// Fix time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f32, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            timestamp_ms,
        }
    }
}

/// The structured message broadcast for each delivered position.
///
/// Addressed to an app-internal topic derived from branding
/// (e.g. `fieldtrack.LOCATION_UPDATE`). Delivery is fire-and-forget:
/// no buffering, no deduplication, positions are forwarded in the
/// order the provider delivers them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub topic: String,
    /// The provider that produced the fix.
    pub provider: ProviderKind,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_update_serializes_flat_fields() {
        let update = PositionUpdate {
            topic: "fieldtrack.LOCATION_UPDATE".to_string(),
            provider: ProviderKind::Satellite,
            position: Position::new(35.6812, 139.7671, 12.5, 1_700_000_000_000),
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["topic"], "fieldtrack.LOCATION_UPDATE");
        assert_eq!(json["provider"], "satellite");
        assert_eq!(json["position"]["latitude"], 35.6812);
        assert_eq!(json["position"]["timestamp_ms"], 1_700_000_000_000i64);
    }
}
