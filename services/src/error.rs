use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("database error during maintenance pass: {0}")]
    Database(#[from] DbErr),

    #[error("a maintenance pass is already running")]
    AlreadyRunning,
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("attendance session {0} not found")]
    SessionNotFound(i64),

    #[error("attendance session {0} is not active")]
    SessionNotActive(i64),

    #[error(transparent)]
    Database(#[from] DbErr),
}
