//! Location tracking lifecycle.

mod session;

pub use session::{StartDecision, TrackingSession, TrackingState};
