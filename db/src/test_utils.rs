use chrono::{DateTime, Utc};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::attendance_session::{self, NewSession, SessionStatus};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Inserts a session on `2025-09-08` for course 1 / teacher 1.
pub async fn seed_session(
    db: &DatabaseConnection,
    start_time: &str,
    duration_minutes: i32,
    status: SessionStatus,
    created_at: DateTime<Utc>,
) -> attendance_session::Model {
    attendance_session::Model::create(
        db,
        NewSession {
            course_id: 1,
            teacher_id: 1,
            title: format!("Lecture at {start_time}"),
            session_date: "2025-09-08".into(),
            start_time: start_time.into(),
            duration_minutes,
            status,
        },
        created_at,
    )
    .await
    .expect("seed session")
}
