//! Application layer for Fieldtrack.
//!
//! This crate provides the use case implementations that coordinate
//! between domain and infrastructure layers: the foreground tracker
//! service and its supporting control, indicator and shutdown types.

pub mod tracker;

pub use tracker::{ControlCommand, ForegroundTracker, LogIndicator, Shutdown, ShutdownReason};
