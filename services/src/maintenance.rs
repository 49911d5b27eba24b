//! The maintenance pass: advance every open session that is due, then retire
//! second-phase keys past their retention window.
//!
//! Every write is a status-qualified bulk `UPDATE`/`DELETE`, so running the
//! pass twice, or two passes side by side, leaves the same end state.

use chrono::{DateTime, Duration, Utc};
use db::models::attendance_session::{Entity as AttendanceSession, SessionStatus};
use db::models::second_phase_key::Entity as SecondPhaseKey;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::time::Instant;
use util::config;

use crate::error::MaintenanceError;
use crate::keys::grace_from_minutes;
use crate::lifecycle::{self, LifecycleRules};

const ACTIVATABLE: [SessionStatus; 2] = [SessionStatus::Future, SessionStatus::Inactive];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceSummary {
    pub activated_count: u64,
    pub expired_count: u64,
    pub keys_purged: u64,
    /// Rows left alone because their schedule could not be interpreted.
    pub skipped: u64,
    /// The pass hit its time budget before reviewing every session.
    pub truncated: bool,
}

impl MaintenanceSummary {
    pub fn transitions(&self) -> u64 {
        self.activated_count + self.expired_count
    }
}

#[derive(Debug, Clone)]
pub struct MaintenancePass {
    rules: LifecycleRules,
    key_grace: Duration,
    batch_size: u64,
    time_budget: std::time::Duration,
}

impl MaintenancePass {
    pub fn new(rules: LifecycleRules) -> Self {
        Self {
            rules,
            key_grace: Duration::hours(1),
            batch_size: 500,
            time_budget: std::time::Duration::from_secs(2),
        }
    }

    pub fn from_config() -> Self {
        Self::new(LifecycleRules::from_config())
            .with_key_grace(grace_from_minutes(config::key_retention_grace_minutes()))
            .with_batch_size(config::maintenance_batch_size())
            .with_time_budget(std::time::Duration::from_millis(
                config::maintenance_max_pass_ms(),
            ))
    }

    pub fn with_key_grace(mut self, grace: Duration) -> Self {
        self.key_grace = grace;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_time_budget(mut self, budget: std::time::Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn rules(&self) -> &LifecycleRules {
        &self.rules
    }

    /// Runs one pass against `now` inside a single transaction.
    ///
    /// Any database error rolls the whole pass back.
    pub async fn run(
        &self,
        db: &DatabaseConnection,
        now: DateTime<Utc>,
    ) -> Result<MaintenanceSummary, MaintenanceError> {
        let started = Instant::now();
        let txn = db.begin().await?;
        let mut summary = MaintenanceSummary::default();
        let mut after_id = 0;

        loop {
            let batch = AttendanceSession::find_reviewable(&txn, after_id, self.batch_size).await?;
            let Some(last) = batch.last() else {
                break;
            };
            after_id = last.id;

            let mut to_active = Vec::new();
            let mut to_expired = Vec::new();

            for session in &batch {
                match lifecycle::next_state(session, now, &self.rules) {
                    Ok(None) => {}
                    Ok(Some(SessionStatus::Active)) => to_active.push(session.id),
                    Ok(Some(SessionStatus::Expired)) => to_expired.push(session.id),
                    Ok(Some(other)) => {
                        tracing::warn!(
                            session_id = session.id,
                            target_status = %other,
                            "Lifecycle produced an unexpected target; skipping"
                        );
                        summary.skipped += 1;
                    }
                    Err(err) => {
                        tracing::warn!(
                            session_id = session.id,
                            error = %err,
                            "Skipping session with unusable schedule"
                        );
                        summary.skipped += 1;
                    }
                }
            }

            summary.activated_count += AttendanceSession::advance_many(
                &txn,
                &to_active,
                &ACTIVATABLE,
                SessionStatus::Active,
                now,
            )
            .await?;
            summary.expired_count += AttendanceSession::advance_many(
                &txn,
                &to_expired,
                &SessionStatus::REVIEWABLE,
                SessionStatus::Expired,
                now,
            )
            .await?;

            if (batch.len() as u64) < self.batch_size {
                break;
            }
            if started.elapsed() >= self.time_budget {
                summary.truncated = true;
                tracing::warn!(
                    after_id,
                    "Maintenance pass hit its time budget; remaining sessions wait for the next pass"
                );
                break;
            }
        }

        summary.keys_purged = SecondPhaseKey::purge_expired(&txn, now - self.key_grace).await?;
        txn.commit().await?;

        tracing::info!(
            now = %now,
            activated = summary.activated_count,
            expired = summary.expired_count,
            keys_purged = summary.keys_purged,
            skipped = summary.skipped,
            truncated = summary.truncated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Maintenance pass complete"
        );

        Ok(summary)
    }
}
