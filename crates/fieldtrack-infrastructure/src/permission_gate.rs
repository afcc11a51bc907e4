//! Permission gate backed by the configured simulated environment.

use std::collections::HashSet;

use fieldtrack_core::config::SimulatedEnvironment;
use fieldtrack_core::permission::{Permission, PermissionGate};

/// A gate whose grants are fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticPermissionGate {
    granted: HashSet<Permission>,
}

impl StaticPermissionGate {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// Builds a gate from the configured environment.
    pub fn from_environment(environment: &SimulatedEnvironment) -> Self {
        Self::new(environment.granted.iter().copied())
    }
}

impl PermissionGate for StaticPermissionGate {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
