//! The persistent foreground indicator.
//!
//! While tracking is active the process must present a persistent,
//! low-priority, non-dismissable status indicator with a single user
//! action that sends the stop signal.

use async_trait::async_trait;
use serde::Serialize;

use fieldtrack_core::config::BrandingConfig;
use fieldtrack_core::error::Result;

use super::command::STOP_SIGNAL;

/// Content of the foreground indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingNotice {
    pub channel_id: String,
    pub channel_name: String,
    pub title: String,
    pub text: String,
    /// Non-dismissable while tracking.
    pub ongoing: bool,
    pub low_priority: bool,
    /// Suppress sound/vibration when the app surface is already visible.
    pub silent: bool,
    /// Signal sent by the single user action.
    pub stop_action: String,
}

/// Builds the indicator content for the current branding and an
/// explicit app-foreground flag. Pure: callers pass the foreground
/// state in rather than reading a process-wide flag.
pub fn tracking_notice(branding: &BrandingConfig, app_in_foreground: bool) -> TrackingNotice {
    TrackingNotice {
        channel_id: branding.channel_id.clone(),
        channel_name: branding.channel_name.clone(),
        title: format!("{} Location Tracking", branding.app_name),
        text: "Tracking your location for site visits".to_string(),
        ongoing: true,
        low_priority: true,
        silent: app_in_foreground,
        stop_action: STOP_SIGNAL.to_string(),
    }
}

/// Presents and clears the persistent indicator.
#[async_trait]
pub trait StatusIndicator: Send + Sync {
    async fn show(&self, notice: TrackingNotice) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Indicator that only logs, for headless hosts.
#[derive(Debug, Default)]
pub struct LogIndicator;

#[async_trait]
impl StatusIndicator for LogIndicator {
    async fn show(&self, notice: TrackingNotice) -> Result<()> {
        tracing::info!(
            channel = %notice.channel_id,
            title = %notice.title,
            "Showing tracking indicator"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        tracing::info!("Clearing tracking indicator");
        Ok(())
    }
}
