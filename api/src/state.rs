use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use services::keys::KeyService;
use services::trigger::LazyTrigger;
use util::clock::{Clock, SystemClock};

/// Shared handles for every request: the database, the time source and the
/// maintenance services built from configuration.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    trigger: Arc<LazyTrigger>,
    keys: KeyService,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
        trigger: Arc<LazyTrigger>,
        keys: KeyService,
    ) -> Self {
        Self {
            db,
            clock,
            trigger,
            keys,
        }
    }

    /// Wall-clock state with services configured from the environment.
    pub fn from_config(db: DatabaseConnection) -> Self {
        Self::new(
            db,
            Arc::new(SystemClock),
            Arc::new(LazyTrigger::from_config()),
            KeyService::from_config(),
        )
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn trigger(&self) -> &LazyTrigger {
        &self.trigger
    }

    pub fn trigger_clone(&self) -> Arc<LazyTrigger> {
        self.trigger.clone()
    }

    pub fn keys(&self) -> &KeyService {
        &self.keys
    }
}
