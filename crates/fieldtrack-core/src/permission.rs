//! Permission model and the platform-version policy table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{FieldtrackError, Result};

/// Grants the tracker may require before starting.
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
pub enum Permission {
    /// Precise location access.
    FineLocation,
    /// Approximate location access.
    CoarseLocation,
    /// Allowance to occupy a foreground-service slot.
    ForegroundService,
}

/// Platform API level the policy table keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiLevel(pub u32);

/// First API level that requires an explicit foreground-service grant.
pub const FOREGROUND_SERVICE_API_LEVEL: ApiLevel = ApiLevel(29);

/// Answers whether a grant is currently held.
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;
}

/// The grants required to start tracking on a given platform version.
///
/// Every level needs at least one of fine/coarse location; levels at
/// or above [`FOREGROUND_SERVICE_API_LEVEL`] additionally need the
/// foreground-service grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionPolicy {
    pub requires_foreground_service: bool,
}

impl PermissionPolicy {
    pub fn for_api_level(level: ApiLevel) -> Self {
        Self {
            requires_foreground_service: level >= FOREGROUND_SERVICE_API_LEVEL,
        }
    }

    /// Checks the policy against the gate.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` naming the missing grants.
    pub fn check(&self, gate: &dyn PermissionGate) -> Result<()> {
        let mut missing = Vec::new();

        let has_location = gate.is_granted(Permission::FineLocation)
            || gate.is_granted(Permission::CoarseLocation);
        if !has_location {
            missing.push(format!(
                "{} or {}",
                Permission::FineLocation,
                Permission::CoarseLocation
            ));
        }

        if self.requires_foreground_service && !gate.is_granted(Permission::ForegroundService) {
            missing.push(Permission::ForegroundService.to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FieldtrackError::permission_denied(missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedGate {
        granted: HashSet<Permission>,
    }

    impl FixedGate {
        fn new(granted: &[Permission]) -> Self {
            Self {
                granted: granted.iter().copied().collect(),
            }
        }
    }

    impl PermissionGate for FixedGate {
        fn is_granted(&self, permission: Permission) -> bool {
            self.granted.contains(&permission)
        }
    }

    #[test]
    fn test_policy_table_keys_on_api_level() {
        assert!(!PermissionPolicy::for_api_level(ApiLevel(28)).requires_foreground_service);
        assert!(PermissionPolicy::for_api_level(ApiLevel(29)).requires_foreground_service);
        assert!(PermissionPolicy::for_api_level(ApiLevel(34)).requires_foreground_service);
    }

    #[test]
    fn test_either_location_grant_suffices_on_old_levels() {
        let policy = PermissionPolicy::for_api_level(ApiLevel(28));
        assert!(policy
            .check(&FixedGate::new(&[Permission::CoarseLocation]))
            .is_ok());
        assert!(policy
            .check(&FixedGate::new(&[Permission::FineLocation]))
            .is_ok());
    }

    #[test]
    fn test_no_location_grant_is_denied() {
        let policy = PermissionPolicy::for_api_level(ApiLevel(28));
        let err = policy
            .check(&FixedGate::new(&[Permission::ForegroundService]))
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("fine_location"));
    }

    #[test]
    fn test_newer_levels_also_require_foreground_service() {
        let policy = PermissionPolicy::for_api_level(ApiLevel(29));
        let err = policy
            .check(&FixedGate::new(&[Permission::FineLocation]))
            .unwrap_err();
        assert!(err.to_string().contains("foreground_service"));

        assert!(policy
            .check(&FixedGate::new(&[
                Permission::FineLocation,
                Permission::ForegroundService
            ]))
            .is_ok());
    }
}
