//! Background loop that fires the maintenance trigger on a fixed period, so
//! sessions advance even when no requests arrive.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use util::clock::Clock;

use crate::trigger::LazyTrigger;

pub fn spawn_maintenance_loop(
    db: DatabaseConnection,
    trigger: Arc<LazyTrigger>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_secs = period.as_secs(), "Maintenance loop started");

        loop {
            ticker.tick().await;
            if let Some(summary) = trigger.fire(&db, clock.now()).await {
                tracing::debug!(transitions = summary.transitions(), "Maintenance loop tick ran a pass");
            }
        }
    })
}
