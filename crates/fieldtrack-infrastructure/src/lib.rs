//! Infrastructure layer for Fieldtrack.
//!
//! Adapters over the host environment: config file storage, path
//! resolution, the configured permission gate, and the simulated and
//! replay location providers the CLI host runs the tracker against.

pub mod config_service;
pub mod config_storage;
pub mod paths;
pub mod permission_gate;
pub mod providers;

pub use config_service::ConfigService;
pub use config_storage::ConfigStorage;
pub use permission_gate::StaticPermissionGate;
pub use providers::{ReplayProvider, SimulatedProvider};
