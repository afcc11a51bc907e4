pub mod config;
pub mod error;
pub mod permission;
pub mod position;
pub mod provider;
pub mod tracking;

// Re-export common error type
pub use error::FieldtrackError;
