//! Persisted "last run" markers for periodic maintenance.
//!
//! A marker is claimed with a compare-and-set on its timestamp, so among any
//! number of processes sharing the database exactly one caller wins a given
//! interval.

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ConnectionTrait, SqlErr};

/// Marker used by the attendance lifecycle pass.
pub const LIFECYCLE_MARKER: &str = "lifecycle";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenance_markers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub last_run_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A successful claim. Hand it back to [`Entity::release`] if the work it
/// guarded did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerClaim {
    pub previous: Option<DateTime<Utc>>,
    pub claimed_at: DateTime<Utc>,
}

impl Entity {
    pub async fn last_run<C>(db: &C, name: &str) -> Result<Option<DateTime<Utc>>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Entity::find_by_id(name.to_owned())
            .one(db)
            .await?
            .map(|m| m.last_run_at))
    }

    /// Claims the marker if it is missing or at least `min_interval` old.
    ///
    /// Returns `None` when the interval has not elapsed or another caller won
    /// the race.
    pub async fn try_claim<C>(
        db: &C,
        name: &str,
        now: DateTime<Utc>,
        min_interval: Duration,
    ) -> Result<Option<MarkerClaim>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(marker) = Entity::find_by_id(name.to_owned()).one(db).await? else {
            let first = ActiveModel {
                name: Set(name.to_owned()),
                last_run_at: Set(now),
            };
            return match first.insert(db).await {
                Ok(_) => Ok(Some(MarkerClaim {
                    previous: None,
                    claimed_at: now,
                })),
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    Ok(None)
                }
                Err(err) => Err(err),
            };
        };

        if now - marker.last_run_at < min_interval {
            return Ok(None);
        }

        let res = Entity::update_many()
            .col_expr(Column::LastRunAt, Expr::value(now))
            .filter(Column::Name.eq(name))
            .filter(Column::LastRunAt.eq(marker.last_run_at))
            .exec(db)
            .await?;

        Ok((res.rows_affected == 1).then_some(MarkerClaim {
            previous: Some(marker.last_run_at),
            claimed_at: now,
        }))
    }

    /// Puts the marker back to what it was before `claim`, unless someone else
    /// has claimed it since.
    pub async fn release<C>(db: &C, name: &str, claim: &MarkerClaim) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        match claim.previous {
            Some(previous) => {
                Entity::update_many()
                    .col_expr(Column::LastRunAt, Expr::value(previous))
                    .filter(Column::Name.eq(name))
                    .filter(Column::LastRunAt.eq(claim.claimed_at))
                    .exec(db)
                    .await?;
            }
            None => {
                Entity::delete_many()
                    .filter(Column::Name.eq(name))
                    .filter(Column::LastRunAt.eq(claim.claimed_at))
                    .exec(db)
                    .await?;
            }
        }
        Ok(())
    }

    /// Unconditionally records a run at `now`.
    pub async fn stamp<C>(db: &C, name: &str, now: DateTime<Utc>) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let marker = ActiveModel {
            name: Set(name.to_owned()),
            last_run_at: Set(now),
        };
        Entity::insert(marker)
            .on_conflict(
                OnConflict::column(Column::Name)
                    .update_column(Column::LastRunAt)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 6, 0, 0).unwrap()
    }

    const INTERVAL: i64 = 120;

    #[tokio::test]
    async fn first_claim_creates_marker() {
        let db = setup_test_db().await;

        let claim = Entity::try_claim(&db, LIFECYCLE_MARKER, t0(), Duration::seconds(INTERVAL))
            .await
            .unwrap()
            .expect("first claim wins");

        assert_eq!(claim.previous, None);
        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), Some(t0()));
    }

    #[tokio::test]
    async fn claim_respects_interval_boundary() {
        let db = setup_test_db().await;
        let interval = Duration::seconds(INTERVAL);
        Entity::try_claim(&db, LIFECYCLE_MARKER, t0(), interval).await.unwrap();

        let early = t0() + Duration::seconds(INTERVAL - 1);
        assert!(Entity::try_claim(&db, LIFECYCLE_MARKER, early, interval)
            .await
            .unwrap()
            .is_none());
        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), Some(t0()));

        let due = t0() + interval;
        let claim = Entity::try_claim(&db, LIFECYCLE_MARKER, due, interval)
            .await
            .unwrap()
            .expect("interval elapsed");
        assert_eq!(claim.previous, Some(t0()));
        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), Some(due));
    }

    #[tokio::test]
    async fn release_restores_previous_value() {
        let db = setup_test_db().await;
        let interval = Duration::seconds(INTERVAL);
        Entity::try_claim(&db, LIFECYCLE_MARKER, t0(), interval).await.unwrap();

        let later = t0() + Duration::minutes(10);
        let claim = Entity::try_claim(&db, LIFECYCLE_MARKER, later, interval)
            .await
            .unwrap()
            .unwrap();
        Entity::release(&db, LIFECYCLE_MARKER, &claim).await.unwrap();

        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), Some(t0()));
    }

    #[tokio::test]
    async fn release_of_first_claim_removes_marker() {
        let db = setup_test_db().await;
        let claim = Entity::try_claim(&db, LIFECYCLE_MARKER, t0(), Duration::seconds(INTERVAL))
            .await
            .unwrap()
            .unwrap();

        Entity::release(&db, LIFECYCLE_MARKER, &claim).await.unwrap();

        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_release_does_not_clobber_newer_claim() {
        let db = setup_test_db().await;
        let interval = Duration::seconds(INTERVAL);
        let first = Entity::try_claim(&db, LIFECYCLE_MARKER, t0(), interval)
            .await
            .unwrap()
            .unwrap();
        let newer = t0() + Duration::minutes(5);
        Entity::stamp(&db, LIFECYCLE_MARKER, newer).await.unwrap();

        Entity::release(&db, LIFECYCLE_MARKER, &first).await.unwrap();

        assert_eq!(Entity::last_run(&db, LIFECYCLE_MARKER).await.unwrap(), Some(newer));
    }

    #[tokio::test]
    async fn markers_are_independent_by_name() {
        let db = setup_test_db().await;
        let interval = Duration::seconds(INTERVAL);
        Entity::try_claim(&db, "a", t0(), interval).await.unwrap();

        assert!(Entity::try_claim(&db, "b", t0(), interval).await.unwrap().is_some());
    }
}
