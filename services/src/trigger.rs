//! Debounced, exclusive entry point to the maintenance pass.
//!
//! Two layers keep passes from overlapping. Inside one process a
//! `tokio::sync::Mutex` is taken with `try_lock`, so a caller that finds a pass
//! in flight skips instead of queueing. Across processes the persisted marker
//! is claimed with a compare-and-set, so one caller wins each interval.

use chrono::{DateTime, Duration, Utc};
use db::models::maintenance_marker::{Entity as MaintenanceMarker, LIFECYCLE_MARKER};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use util::config;

use crate::error::MaintenanceError;
use crate::maintenance::{MaintenancePass, MaintenanceSummary};

const DEFAULT_MIN_INTERVAL_SECS: i64 = 120;

/// Debounce interval from configured seconds; unrepresentable values fall
/// back to the default.
fn interval_from_seconds(seconds: u64) -> Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| {
            tracing::warn!(seconds, "MAINTENANCE_MIN_INTERVAL_SECONDS out of range; using 120");
            Duration::seconds(DEFAULT_MIN_INTERVAL_SECS)
        })
}

pub struct LazyTrigger {
    pass: MaintenancePass,
    min_interval: Duration,
    marker: String,
    gate: Mutex<()>,
}

impl LazyTrigger {
    pub fn new(pass: MaintenancePass, min_interval: Duration) -> Self {
        Self {
            pass,
            min_interval,
            marker: LIFECYCLE_MARKER.to_owned(),
            gate: Mutex::new(()),
        }
    }

    pub fn from_config() -> Self {
        Self::new(
            MaintenancePass::from_config(),
            interval_from_seconds(config::min_interval_seconds()),
        )
    }

    pub fn pass(&self) -> &MaintenancePass {
        &self.pass
    }

    /// Claims the marker for this interval. `true` means the caller owns the
    /// next pass; the marker is only moved when returning `true`.
    ///
    /// A database failure reads as `false`.
    pub async fn should_run(&self, db: &DatabaseConnection, now: DateTime<Utc>) -> bool {
        match MaintenanceMarker::try_claim(db, &self.marker, now, self.min_interval).await {
            Ok(claim) => claim.is_some(),
            Err(err) => {
                tracing::error!(
                    marker = %self.marker,
                    error = %err,
                    "Failed to claim maintenance marker"
                );
                false
            }
        }
    }

    /// Request-side entry. Runs a pass if none is in flight here and the
    /// interval has elapsed, and returns its summary. Never fails: errors are
    /// logged and the marker is put back so the next caller retries.
    pub async fn fire(&self, db: &DatabaseConnection, now: DateTime<Utc>) -> Option<MaintenanceSummary> {
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!("Maintenance pass already in flight; skipping");
            return None;
        };

        let claim = match MaintenanceMarker::try_claim(db, &self.marker, now, self.min_interval).await {
            Ok(Some(claim)) => claim,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(
                    marker = %self.marker,
                    error = %err,
                    "Failed to claim maintenance marker"
                );
                return None;
            }
        };

        match self.pass.run(db, now).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                tracing::error!(
                    marker = %self.marker,
                    now = %now,
                    error = %err,
                    "Maintenance pass failed; rolling back marker"
                );
                if let Err(release_err) = MaintenanceMarker::release(db, &self.marker, &claim).await {
                    tracing::error!(
                        marker = %self.marker,
                        error = %release_err,
                        "Failed to restore maintenance marker"
                    );
                }
                None
            }
        }
    }

    /// Runs a pass now, ignoring the interval. Still exclusive with `fire`
    /// in this process, and records the run on success.
    pub async fn force(
        &self,
        db: &DatabaseConnection,
        now: DateTime<Utc>,
    ) -> Result<MaintenanceSummary, MaintenanceError> {
        let _guard = self
            .gate
            .try_lock()
            .map_err(|_| MaintenanceError::AlreadyRunning)?;

        let summary = self.pass.run(db, now).await?;
        MaintenanceMarker::stamp(db, &self.marker, now).await?;
        Ok(summary)
    }
}
