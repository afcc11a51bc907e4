//! The foreground tracker service.
//!
//! Owns the single tracking session of the hosting process: permission
//! checks, provider selection with fallback, update registration, the
//! persistent indicator, position fan-out and the stop command. All
//! failure paths are terminal - the tracker requests process shutdown
//! with a do-not-restart disposition instead of retrying.

use std::sync::Arc;
use std::sync::Weak;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use uuid::Uuid;

use fieldtrack_core::FieldtrackError;
use fieldtrack_core::config::BrandingConfig;
use fieldtrack_core::error::Result;
use fieldtrack_core::permission::{PermissionGate, PermissionPolicy};
use fieldtrack_core::position::PositionUpdate;
use fieldtrack_core::provider::{
    LocationProvider, PositionFeed, PositionFeedReceiver, ProviderKind, Registration,
    UpdateRequest,
};
use fieldtrack_core::tracking::{StartDecision, TrackingSession, TrackingState};

use super::command::ControlCommand;
use super::indicator::{StatusIndicator, tracking_notice};
use super::shutdown::{Shutdown, ShutdownReason};

/// Capacity of the outbound broadcast channel. Lagging receivers lose
/// the oldest updates, matching fire-and-forget delivery.
const BROADCAST_CAPACITY: usize = 64;

/// Lifecycle owner for continuous position updates.
///
/// Lifecycle operations (`start`, `stop`, `handle_command`) are
/// serialized on the session lock; position delivery arrives on
/// provider tasks and is gated by a watch-mirrored phase so the
/// delivery path never blocks on the lifecycle lock. A fix racing an
/// in-flight start is held until the start settles.
pub struct ForegroundTracker {
    session_id: Uuid,
    branding: BrandingConfig,
    topic: String,
    policy: PermissionPolicy,
    gate: Arc<dyn PermissionGate>,
    providers: Vec<Arc<dyn LocationProvider>>,
    indicator: Arc<dyn StatusIndicator>,
    shutdown: Arc<Shutdown>,
    session: Mutex<TrackingSession>,
    phase: watch::Sender<TrackingState>,
    events: broadcast::Sender<PositionUpdate>,
    feed: PositionFeed,
}

impl ForegroundTracker {
    pub fn new(
        branding: BrandingConfig,
        policy: PermissionPolicy,
        request: UpdateRequest,
        gate: Arc<dyn PermissionGate>,
        providers: Vec<Arc<dyn LocationProvider>>,
        indicator: Arc<dyn StatusIndicator>,
    ) -> Arc<Self> {
        let (feed, feed_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (phase, _) = watch::channel(TrackingState::Idle);

        let tracker = Arc::new(Self {
            session_id: Uuid::new_v4(),
            topic: branding.update_topic(),
            branding,
            policy,
            gate,
            providers,
            indicator,
            shutdown: Arc::new(Shutdown::new()),
            session: Mutex::new(TrackingSession::new(request)),
            phase,
            events,
            feed,
        });

        tracing::debug!(session = %tracker.session_id, "Tracker created");
        tokio::spawn(Self::deliver(Arc::downgrade(&tracker), feed_rx));

        tracker
    }

    /// Starts tracking.
    ///
    /// No-op returning success when already active. On any failure the
    /// session stays (or returns to) `Idle` and process shutdown is
    /// requested - a half-configured tracker that silently provides no
    /// updates is worse than an absent one.
    ///
    /// # Arguments
    ///
    /// * `app_in_foreground` - explicit foreground state, passed into
    ///   the indicator decision instead of a process-wide flag
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `NoProviderAvailable` or `Registration`;
    /// all three are terminal for the hosting process.
    pub async fn start(&self, app_in_foreground: bool) -> Result<()> {
        if let Err(e) = self.policy.check(self.gate.as_ref()) {
            tracing::error!(session = %self.session_id, "Cannot start tracking: {}", e);
            self.shutdown.request(ShutdownReason::PermissionDenied);
            return Err(e);
        }

        let mut session = self.session.lock().await;
        if session.begin_start() == StartDecision::AlreadyActive {
            tracing::debug!(session = %self.session_id, "Already tracking location");
            return Ok(());
        }
        self.phase.send_replace(TrackingState::Starting);

        // The persistent indicator goes up before registration, the way
        // a foreground-service slot is claimed before tracking begins.
        let notice = tracking_notice(&self.branding, app_in_foreground);
        if let Err(e) = self.indicator.show(notice).await {
            tracing::error!(session = %self.session_id, "Failed to show indicator: {}", e);
            session.abort_start();
            self.phase.send_replace(TrackingState::Idle);
            self.shutdown.request(ShutdownReason::RegistrationFailure);
            return Err(e);
        }

        let plan = match self.select_providers().await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(session = %self.session_id, "No location provider available");
                self.clear_indicator().await;
                session.abort_start();
                self.phase.send_replace(TrackingState::Idle);
                self.shutdown.request(ShutdownReason::NoProviderAvailable);
                return Err(e);
            }
        };

        let mut registrations: Vec<Registration> = Vec::with_capacity(plan.len());
        for provider in &plan {
            match provider
                .request_updates(session.request(), self.feed.clone())
                .await
            {
                Ok(registration) => registrations.push(registration),
                Err(e) => {
                    tracing::error!(
                        session = %self.session_id,
                        provider = %provider.kind(),
                        "Failed to start location tracking: {}",
                        e
                    );
                    self.remove_registrations(registrations).await;
                    self.clear_indicator().await;
                    session.abort_start();
                    self.phase.send_replace(TrackingState::Idle);
                    self.shutdown.request(ShutdownReason::RegistrationFailure);
                    return Err(e);
                }
            }
        }

        session.complete_start(registrations);
        self.phase.send_replace(TrackingState::Active);
        tracing::info!(
            session = %self.session_id,
            primary = %plan[0].kind(),
            sources = plan.len(),
            "Location tracking started"
        );

        Ok(())
    }

    /// Stops tracking. Idempotent; deregistration failures are logged
    /// and swallowed since tracking is already being torn down.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        if session.state() == TrackingState::Idle {
            tracing::debug!(session = %self.session_id, "Stop requested while idle");
            return;
        }

        self.phase.send_replace(TrackingState::Stopping);
        let registrations = session.begin_stop();
        self.remove_registrations(registrations).await;
        self.clear_indicator().await;
        session.complete_stop();
        self.phase.send_replace(TrackingState::Idle);

        tracing::info!(session = %self.session_id, "Location tracking stopped");
    }

    /// Handles an out-of-band control message. The stop signal runs
    /// `stop()` and then requests process termination; any other signal
    /// starts (or continues) tracking.
    ///
    /// # Errors
    ///
    /// Propagates start failures; stopping never fails.
    pub async fn handle_command(&self, signal: &str) -> Result<()> {
        match ControlCommand::parse(signal) {
            ControlCommand::Stop => {
                tracing::info!(session = %self.session_id, "Stop command received");
                self.stop().await;
                self.shutdown.request(ShutdownReason::StopRequested);
                Ok(())
            }
            // Control messages arrive from the background surface.
            ControlCommand::Start => self.start(false).await,
        }
    }

    /// Subscribes to outbound position updates.
    pub fn subscribe(&self) -> broadcast::Receiver<PositionUpdate> {
        self.events.subscribe()
    }

    pub fn shutdown(&self) -> Arc<Shutdown> {
        Arc::clone(&self.shutdown)
    }

    pub async fn state(&self) -> TrackingState {
        self.session.lock().await.state()
    }

    pub fn is_active(&self) -> bool {
        *self.phase.borrow() == TrackingState::Active
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Picks the registration plan: the most accurate enabled provider,
    /// plus the network provider as a supplementary source when the
    /// primary is satellite-based.
    async fn select_providers(&self) -> Result<Vec<Arc<dyn LocationProvider>>> {
        let mut primary = None;
        for kind in ProviderKind::PREFERENCE {
            if let Some(provider) = self.provider_by_kind(kind)
                && provider.is_enabled().await
            {
                primary = Some(provider);
                break;
            }
        }
        let Some(primary) = primary else {
            return Err(FieldtrackError::NoProviderAvailable);
        };

        let mut plan = vec![Arc::clone(&primary)];
        if primary.kind() == ProviderKind::Satellite
            && let Some(network) = self.provider_by_kind(ProviderKind::Network)
            && network.is_enabled().await
        {
            plan.push(network);
        }

        Ok(plan)
    }

    fn provider_by_kind(&self, kind: ProviderKind) -> Option<Arc<dyn LocationProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.kind() == kind)
            .cloned()
    }

    async fn remove_registrations(&self, registrations: Vec<Registration>) {
        for registration in registrations {
            let Some(provider) = self.provider_by_kind(registration.provider) else {
                continue;
            };
            if let Err(e) = provider.remove_updates(registration).await {
                tracing::warn!(
                    session = %self.session_id,
                    provider = %registration.provider,
                    "Failed to remove updates: {}",
                    e
                );
            }
        }
    }

    async fn clear_indicator(&self) {
        if let Err(e) = self.indicator.clear().await {
            tracing::warn!(session = %self.session_id, "Failed to clear indicator: {}", e);
        }
    }

    /// Delivery pump: forwards provider fixes to the broadcast channel
    /// while the session is active. A fix pushed while a start is still
    /// registering providers waits for the start to settle instead of
    /// being dropped. Runs until the tracker is dropped and the feed
    /// drains.
    async fn deliver(tracker: Weak<ForegroundTracker>, mut feed_rx: PositionFeedReceiver) {
        while let Some((provider, position)) = feed_rx.recv().await {
            let Some(tracker) = tracker.upgrade() else {
                break;
            };

            let mut phase = tracker.phase.subscribe();
            while *phase.borrow_and_update() == TrackingState::Starting {
                if phase.changed().await.is_err() {
                    return;
                }
            }
            if *phase.borrow() != TrackingState::Active {
                tracing::trace!(provider = %provider, "Dropping fix delivered while inactive");
                continue;
            }

            tracing::debug!(
                session = %tracker.session_id,
                provider = %provider,
                latitude = position.latitude,
                longitude = position.longitude,
                accuracy_m = position.accuracy_m,
                "Position update"
            );

            // Fire-and-forget: nobody listening is not an error.
            let _ = tracker.events.send(PositionUpdate {
                topic: tracker.topic.clone(),
                provider,
                position,
            });
        }
    }
}
