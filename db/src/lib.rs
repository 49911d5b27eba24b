pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use util::{config, paths};

/// Opens the application database named by `DATABASE_PATH`.
///
/// A plain file path is treated as SQLite; its parent directory is created
/// first because SQLite won't create intermediate dirs.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    let url = paths::database_url(&path_or_url);

    if !paths::is_dsn(&path_or_url) {
        if let Err(err) = paths::ensure_parent_dir(&path_or_url) {
            tracing::warn!(path = %path_or_url, error = %err, "Could not create database directory");
        }
    }

    Database::connect(&url).await
}
