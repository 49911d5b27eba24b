//! Issuing and checking second-phase keys.

use chrono::{DateTime, Duration, Utc};
use db::models::attendance_session::{Model as Session, SessionStatus};
use db::models::second_phase_key::Model as SecondPhaseKey;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use util::config;

use crate::error::KeyError;

const MIN_TTL_SECONDS: i64 = 5;
const MAX_TTL_SECONDS: i64 = 300;
const DEFAULT_GRACE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyVerdict {
    Valid,
    /// Past `valid_until` but still inside the retention window.
    Grace,
    Expired,
    #[default]
    Unknown,
    SessionInactive,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyService {
    default_ttl: Duration,
    grace: Duration,
}

/// Clamps raw seconds before they become a `Duration`, which panics on
/// values outside its range.
fn clamp_ttl(seconds: i64) -> Duration {
    Duration::seconds(seconds.clamp(MIN_TTL_SECONDS, MAX_TTL_SECONDS))
}

/// Retention grace from configured minutes; unrepresentable values fall back
/// to an hour.
pub fn grace_from_minutes(minutes: i64) -> Duration {
    Duration::try_minutes(minutes).unwrap_or_else(|| {
        tracing::warn!(minutes, "KEY_RETENTION_GRACE_MINUTES out of range; using 60");
        Duration::minutes(DEFAULT_GRACE_MINUTES)
    })
}

impl KeyService {
    pub fn new(default_ttl_seconds: i64, grace: Duration) -> Self {
        Self {
            default_ttl: clamp_ttl(default_ttl_seconds),
            grace,
        }
    }

    pub fn from_config() -> Self {
        Self::new(
            config::second_phase_key_ttl_seconds(),
            grace_from_minutes(config::key_retention_grace_minutes()),
        )
    }

    /// Issues a key for an `active` session. `ttl_seconds` is clamped to
    /// 5..=300.
    pub async fn issue(
        &self,
        db: &DatabaseConnection,
        session_id: i64,
        ttl_seconds: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<SecondPhaseKey, KeyError> {
        let session = Session::find_by_id(db, session_id)
            .await?
            .ok_or(KeyError::SessionNotFound(session_id))?;

        if session.status != SessionStatus::Active {
            return Err(KeyError::SessionNotActive(session_id));
        }

        let ttl = ttl_seconds.map(clamp_ttl).unwrap_or(self.default_ttl);
        let key = SecondPhaseKey::issue(db, session_id, ttl, now).await?;
        tracing::debug!(session_id, valid_until = %key.valid_until, "Issued second-phase key");
        Ok(key)
    }

    pub async fn verify(
        &self,
        db: &DatabaseConnection,
        session_id: i64,
        key_value: &str,
        now: DateTime<Utc>,
    ) -> Result<KeyVerdict, KeyError> {
        let session = Session::find_by_id(db, session_id)
            .await?
            .ok_or(KeyError::SessionNotFound(session_id))?;

        if session.status != SessionStatus::Active {
            return Ok(KeyVerdict::SessionInactive);
        }

        let Some(key) = SecondPhaseKey::find_for_session(db, session_id, key_value).await? else {
            return Ok(KeyVerdict::Unknown);
        };

        Ok(match key.expired_for(now) {
            None => KeyVerdict::Valid,
            Some(late) if late <= self.grace => KeyVerdict::Grace,
            Some(_) => KeyVerdict::Expired,
        })
    }
}
