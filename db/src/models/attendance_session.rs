//! Attendance sessions: one scheduled attendance-taking window for a course meeting.
//!
//! `session_date` and `start_time` are stored as local wall-clock text without
//! an offset. Turning them into an instant is the lifecycle engine's job.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i32,
    pub status: SessionStatus,
    /// Mirrors `status == active` for consumers that filter on the flag.
    pub is_active: bool,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionStatus {
    #[sea_orm(string_value = "future")]
    Future,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl SessionStatus {
    /// States the maintenance pass has to look at.
    pub const REVIEWABLE: [SessionStatus; 3] = [
        SessionStatus::Future,
        SessionStatus::Inactive,
        SessionStatus::Active,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Expired | SessionStatus::Closed)
    }

    /// Manual close is only allowed from these states.
    pub const CLOSABLE: [SessionStatus; 2] = [SessionStatus::Inactive, SessionStatus::Active];

    /// Position along `future -> inactive -> active -> expired`.
    /// `closed` sits beside `expired` as the other terminal state.
    pub fn rank(self) -> u8 {
        match self {
            SessionStatus::Future => 0,
            SessionStatus::Inactive => 1,
            SessionStatus::Active => 2,
            SessionStatus::Expired | SessionStatus::Closed => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::second_phase_key::Entity")]
    Keys,
}

impl Related<super::second_phase_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied by course tooling when scheduling a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub course_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub session_date: String,
    pub start_time: String,
    pub duration_minutes: i32,
    pub status: SessionStatus,
}

impl Model {
    pub async fn create(
        db: &DbConn,
        new: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            course_id: Set(new.course_id),
            teacher_id: Set(new.teacher_id),
            title: Set(new.title),
            session_date: Set(new.session_date),
            start_time: Set(new.start_time),
            duration_minutes: Set(new.duration_minutes),
            is_active: Set(new.status == SessionStatus::Active),
            status: Set(new.status),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Manual close. Only `inactive` and `active` sessions can be closed; the
    /// update is conditional so it cannot clobber a concurrent expiry.
    pub async fn close(db: &DbConn, id: i64, now: DateTime<Utc>) -> Result<Model, DbErr> {
        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(SessionStatus::Closed))
            .col_expr(Column::IsActive, Expr::value(false))
            .col_expr(Column::ClosedAt, Expr::value(Some(now)))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::ClosedAt.is_null())
            .filter(Column::Status.is_in(SessionStatus::CLOSABLE))
            .exec(db)
            .await?;

        let current = Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
            DbErr::RecordNotFound(format!("Attendance session {id} not found"))
        })?;

        if res.rows_affected == 0 {
            return Err(DbErr::Custom(format!(
                "Attendance session {id} cannot be closed while {}",
                current.status
            )));
        }

        Ok(current)
    }
}

impl Entity {
    /// Sessions the maintenance pass has to review, in id order, starting
    /// after `after_id`.
    pub async fn find_reviewable<C>(
        db: &C,
        after_id: i64,
        limit: u64,
    ) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::ClosedAt.is_null())
            .filter(Column::Status.is_in(SessionStatus::REVIEWABLE))
            .filter(Column::Id.gt(after_id))
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// Moves every session in `ids` that is still in one of `from` to `to`.
    ///
    /// Returns the number of rows actually changed; rows already moved by a
    /// concurrent pass, or closed in the meantime, are left alone.
    pub async fn advance_many<C>(
        db: &C,
        ids: &[i64],
        from: &[SessionStatus],
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to))
            .col_expr(Column::IsActive, Expr::value(to == SessionStatus::Active))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .filter(Column::Status.is_in(from.iter().copied()))
            .filter(Column::ClosedAt.is_null())
            .exec(db)
            .await?;

        Ok(res.rows_affected)
    }
}
