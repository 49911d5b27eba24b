//! Second-phase keys: short-lived credentials that gate the confirmation step
//! of a check-in. Keys are only ever deleted by the maintenance pass.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sea_orm::ActiveValue::Set;
use sea_orm::ConnectionTrait;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "second_phase_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    #[sea_orm(unique)]
    pub key_value: String,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 32 random bytes from the OS, hex encoded.
fn generate_key_value() -> String {
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

impl Model {
    pub async fn issue(
        db: &DbConn,
        session_id: i64,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            session_id: Set(session_id),
            key_value: Set(generate_key_value()),
            valid_until: Set(now + ttl),
            created_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_for_session(
        db: &DbConn,
        session_id: i64,
        key_value: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::KeyValue.eq(key_value))
            .one(db)
            .await
    }

    /// `valid_until` itself is still usable.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.valid_until
    }

    /// How long ago the key stopped being usable, if it has.
    pub fn expired_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        (now > self.valid_until).then(|| now - self.valid_until)
    }
}

impl Entity {
    /// Deletes keys whose `valid_until` is strictly before `cutoff`.
    pub async fn purge_expired<C>(db: &C, cutoff: DateTime<Utc>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Entity::delete_many()
            .filter(Column::ValidUntil.lt(cutoff))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
