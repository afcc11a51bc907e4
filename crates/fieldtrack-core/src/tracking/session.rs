//! The tracking session state machine.
//!
//! One `TrackingSession` exists per running service process. It is not
//! persisted across restarts. Invariant: update registrations exist
//! with providers if and only if the session is `Active` - no duplicate
//! registration, no dangling registration after stop.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::provider::{Registration, UpdateRequest};

/// Lifecycle states: `Idle -> Starting -> Active -> Stopping -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackingState {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Outcome of a start attempt on the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDecision {
    /// The session moved to `Starting`; the caller must register
    /// providers and then call `complete_start` or `abort_start`.
    Proceed,
    /// Already active (or a start is in flight); the caller treats this
    /// as success without touching registrations.
    AlreadyActive,
}

/// The single tracking session owned by a service process.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    state: TrackingState,
    request: UpdateRequest,
    registrations: Vec<Registration>,
}

impl TrackingSession {
    pub fn new(request: UpdateRequest) -> Self {
        Self {
            state: TrackingState::Idle,
            request,
            registrations: Vec::new(),
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TrackingState::Active
    }

    pub fn request(&self) -> UpdateRequest {
        self.request
    }

    /// Live registrations held by this session.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Begins a start attempt. From `Idle` the session moves to
    /// `Starting`; from any other state the attempt is a no-op.
    pub fn begin_start(&mut self) -> StartDecision {
        match self.state {
            TrackingState::Idle => {
                self.state = TrackingState::Starting;
                StartDecision::Proceed
            }
            _ => StartDecision::AlreadyActive,
        }
    }

    /// Completes a start attempt, recording the registrations that were
    /// created. `Starting -> Active`.
    pub fn complete_start(&mut self, registrations: Vec<Registration>) {
        debug_assert_eq!(self.state, TrackingState::Starting);
        self.registrations = registrations;
        self.state = TrackingState::Active;
    }

    /// Aborts a failed start attempt. `Starting -> Idle`.
    pub fn abort_start(&mut self) {
        debug_assert_eq!(self.state, TrackingState::Starting);
        self.registrations.clear();
        self.state = TrackingState::Idle;
    }

    /// Begins teardown and drains the registrations to remove.
    /// Idempotent: from `Idle` this returns an empty list and the state
    /// is unchanged.
    pub fn begin_stop(&mut self) -> Vec<Registration> {
        match self.state {
            TrackingState::Idle => Vec::new(),
            _ => {
                self.state = TrackingState::Stopping;
                std::mem::take(&mut self.registrations)
            }
        }
    }

    /// Completes teardown. `Stopping -> Idle`.
    pub fn complete_stop(&mut self) {
        self.registrations.clear();
        self.state = TrackingState::Idle;
    }
}
