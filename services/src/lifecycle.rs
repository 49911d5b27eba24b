//! Session state machine.
//!
//! Pure: given a session row, the current instant and the rules, decide which
//! status the row should be in. Nothing here touches the database.
//!
//! ```text
//! future / inactive --(now >= start)--> active --(now > end)--> expired
//! inactive ---------------------(now > end)-------------------> expired
//! ```
//!
//! The start check is inclusive and the expiry check strict: a session is
//! already active at exactly its start instant and still active at exactly its
//! end instant.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use db::models::attendance_session::{Model as Session, SessionStatus};
use thiserror::Error;
use util::config;

/// Default offset used when `SESSION_UTC_OFFSET_MINUTES` is out of range (UTC+3).
const FALLBACK_OFFSET_SECS: i32 = 3 * 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unparsable session_date {0:?}")]
    InvalidDate(String),
    #[error("unparsable start_time {0:?}")]
    InvalidTime(String),
    #[error("duration_minutes must be positive, got {0}")]
    InvalidDuration(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleRules {
    /// Zone the stored wall-clock date/time is interpreted in.
    pub timezone: FixedOffset,
    /// Whether `inactive` sessions auto-activate like `future` ones.
    pub resume_inactive: bool,
}

impl LifecycleRules {
    pub fn new(timezone: FixedOffset) -> Self {
        Self {
            timezone,
            resume_inactive: true,
        }
    }

    pub fn with_resume_inactive(mut self, resume_inactive: bool) -> Self {
        self.resume_inactive = resume_inactive;
        self
    }

    pub fn from_config() -> Self {
        let minutes = config::session_utc_offset_minutes();
        let timezone = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(minutes, "SESSION_UTC_OFFSET_MINUTES out of range; using UTC+3");
                FixedOffset::east_opt(FALLBACK_OFFSET_SECS).unwrap_or(Utc.fix())
            });
        Self::new(timezone).with_resume_inactive(config::session_resume_inactive())
    }
}

/// Scheduled window of a session as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(raw.to_owned()))
}

fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_owned()))
}

/// Resolves the session's local date/time in `rules.timezone`.
pub fn window(session: &Session, rules: &LifecycleRules) -> Result<SessionWindow, ScheduleError> {
    if session.duration_minutes <= 0 {
        return Err(ScheduleError::InvalidDuration(session.duration_minutes));
    }

    let local = parse_date(&session.session_date)?.and_time(parse_time(&session.start_time)?);
    // A fixed offset maps every local time to exactly one instant.
    let start = rules
        .timezone
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| ScheduleError::InvalidTime(session.start_time.clone()))?
        .with_timezone(&Utc);
    let end = start + Duration::minutes(i64::from(session.duration_minutes));

    Ok(SessionWindow { start, end })
}

/// The status `session` should move to at `now`, or `None` if it stays put.
///
/// Activation and expiry are applied in sequence to the same `now`, so a
/// `future` session whose entire window has passed goes straight to `expired`.
pub fn next_state(
    session: &Session,
    now: DateTime<Utc>,
    rules: &LifecycleRules,
) -> Result<Option<SessionStatus>, ScheduleError> {
    if session.closed_at.is_some() || session.status.is_terminal() {
        return Ok(None);
    }

    let window = window(session, rules)?;
    let mut status = session.status;

    let may_activate = match status {
        SessionStatus::Future => true,
        SessionStatus::Inactive => rules.resume_inactive,
        _ => false,
    };
    if may_activate && now >= window.start {
        status = SessionStatus::Active;
    }

    if matches!(status, SessionStatus::Active | SessionStatus::Inactive) && now > window.end {
        status = SessionStatus::Expired;
    }

    Ok((status != session.status).then_some(status))
}
