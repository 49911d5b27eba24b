use chrono::SecondsFormat;
use db::models::{attendance_session, second_phase_key};
use serde::{Deserialize, Serialize};
use services::keys::KeyVerdict;
use services::lifecycle::{self, LifecycleRules};

#[derive(Debug, Default, Serialize)]
pub struct SessionResponse {
    pub id: i64,
    pub course_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i32,
    pub status: String,
    pub is_active: bool,
    /// `None` when the stored schedule cannot be interpreted.
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub closed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SessionResponse {
    pub fn from_model(m: attendance_session::Model, rules: &LifecycleRules) -> Self {
        let window = lifecycle::window(&m, rules).ok();
        let rfc3339 = |t: chrono::DateTime<chrono::Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);

        Self {
            id: m.id,
            course_id: m.course_id,
            teacher_id: m.teacher_id,
            title: m.title,
            session_date: m.session_date,
            start_time: m.start_time,
            duration_minutes: m.duration_minutes,
            status: m.status.to_string(),
            is_active: m.is_active,
            starts_at: window.map(|w| rfc3339(w.start)),
            ends_at: window.map(|w| rfc3339(w.end)),
            closed_at: m.closed_at.map(rfc3339),
            created_at: rfc3339(m.created_at),
            updated_at: rfc3339(m.updated_at),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueKeyReq {
    pub ttl_seconds: Option<i64>,
}

#[derive(Debug, Default, Serialize)]
pub struct KeyResponse {
    pub session_id: i64,
    pub key: String,
    pub valid_until: String,
}

impl From<second_phase_key::Model> for KeyResponse {
    fn from(m: second_phase_key::Model) -> Self {
        Self {
            session_id: m.session_id,
            key: m.key_value,
            valid_until: m.valid_until.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyKeyReq {
    pub key: String,
}

#[derive(Debug, Default, Serialize)]
pub struct VerifyKeyResponse {
    pub verdict: KeyVerdict,
}
