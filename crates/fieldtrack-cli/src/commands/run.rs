//! The `run` subcommand: hosts a tracking session in the terminal.
//!
//! Plays the role the service process plays on a device: it builds the
//! tracker from config, starts it, streams broadcast updates to the
//! log, and exits when shutdown is requested. Terminal tracker failures
//! map to a nonzero exit with no restart.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::broadcast::error::RecvError;

use fieldtrack_application::tracker::STOP_SIGNAL;
use fieldtrack_application::{ForegroundTracker, LogIndicator, ShutdownReason};
use fieldtrack_core::permission::{ApiLevel, PermissionGate, PermissionPolicy};
use fieldtrack_core::provider::{LocationProvider, ProviderKind};
use fieldtrack_infrastructure::{ConfigService, ReplayProvider, SimulatedProvider, StaticPermissionGate};

pub async fn execute(
    config_service: ConfigService,
    fixture: Option<PathBuf>,
    cadence_ms: u64,
    max_updates: Option<u64>,
) -> Result<()> {
    let config = config_service.get_config();
    let environment = &config.environment;

    let gate: Arc<dyn PermissionGate> =
        Arc::new(StaticPermissionGate::from_environment(environment));
    let policy = PermissionPolicy::for_api_level(ApiLevel(environment.api_level));

    let satellite: Arc<dyn LocationProvider> = match &fixture {
        Some(path) => Arc::new(
            ReplayProvider::from_path(ProviderKind::Satellite, path)?
                .with_cadence(Duration::from_millis(cadence_ms)),
        ),
        None => Arc::new(SimulatedProvider::new(
            ProviderKind::Satellite,
            environment
                .enabled_providers
                .contains(&ProviderKind::Satellite),
        )),
    };
    let network: Arc<dyn LocationProvider> = Arc::new(SimulatedProvider::new(
        ProviderKind::Network,
        environment
            .enabled_providers
            .contains(&ProviderKind::Network),
    ));

    let tracker = ForegroundTracker::new(
        config.branding.clone(),
        policy,
        config.update,
        gate,
        vec![satellite, network],
        Arc::new(LogIndicator),
    );
    let shutdown = tracker.shutdown();
    let mut updates = tracker.subscribe();

    tracker.start(false).await?;

    let mut delivered: u64 = 0;
    loop {
        tokio::select! {
            _ = shutdown.requested() => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, sending stop signal");
                tracker.handle_command(STOP_SIGNAL).await?;
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    delivered += 1;
                    tracing::info!(
                        topic = %update.topic,
                        provider = %update.provider,
                        latitude = update.position.latitude,
                        longitude = update.position.longitude,
                        accuracy_m = update.position.accuracy_m,
                        timestamp_ms = update.position.timestamp_ms,
                        "Position update"
                    );
                    if let Some(max) = max_updates
                        && delivered >= max
                    {
                        tracing::info!(delivered, "Update budget reached, stopping");
                        tracker.handle_command(STOP_SIGNAL).await?;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Receiver lagged behind broadcast");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    match shutdown.reason() {
        Some(ShutdownReason::StopRequested) | None => {
            tracing::info!(delivered, "Tracking session ended");
            Ok(())
        }
        Some(reason) => Err(anyhow!("tracker terminated: {reason}")),
    }
}
