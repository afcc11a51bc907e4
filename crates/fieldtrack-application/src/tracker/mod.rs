//! Foreground tracker use case.

pub mod command;
pub mod indicator;
pub mod service;
pub mod shutdown;

pub use command::{ControlCommand, STOP_SIGNAL};
pub use indicator::{LogIndicator, StatusIndicator, TrackingNotice, tracking_notice};
pub use service::ForegroundTracker;
pub use shutdown::{Shutdown, ShutdownReason};
