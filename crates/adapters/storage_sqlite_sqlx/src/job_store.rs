//! `SQLite` implementation of [`JobStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use airsched_app::ports::{JobPurpose, JobStore, PendingJob};
use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;

use crate::error::StorageError;

struct Wrapper(PendingJob);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let profile_id: i64 = row.try_get("profile_id")?;
        let purpose: String = row.try_get("purpose")?;
        let fire_at: String = row.try_get("fire_at")?;

        let purpose =
            JobPurpose::from_str(&purpose).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let fire_at = chrono::DateTime::parse_from_rfc3339(&fire_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(PendingJob {
            profile_id: ProfileId::new(profile_id),
            purpose,
            fire_at,
        }))
    }
}

/// `SQLite`-backed pending-job store.
///
/// One row per `(profile_id, purpose)` slot; upserting an existing pair
/// replaces its firing instant.
#[derive(Clone)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl JobStore for SqliteJobStore {
    async fn upsert(&self, job: PendingJob) -> Result<(), AirschedError> {
        sqlx::query(
            "INSERT INTO pending_jobs (profile_id, purpose, fire_at) VALUES (?, ?, ?) \
             ON CONFLICT (profile_id, purpose) DO UPDATE SET fire_at = excluded.fire_at",
        )
        .bind(job.profile_id.as_i64())
        .bind(job.purpose.to_string())
        .bind(job.fire_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn remove(&self, profile_id: ProfileId, purpose: JobPurpose) -> Result<(), AirschedError> {
        sqlx::query("DELETE FROM pending_jobs WHERE profile_id = ? AND purpose = ?")
            .bind(profile_id.as_i64())
            .bind(purpose.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn remove_exact(&self, job: PendingJob) -> Result<(), AirschedError> {
        sqlx::query(
            "DELETE FROM pending_jobs WHERE profile_id = ? AND purpose = ? AND fire_at = ?",
        )
        .bind(job.profile_id.as_i64())
        .bind(job.purpose.to_string())
        .bind(job.fire_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PendingJob>, AirschedError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM pending_jobs")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::{TimeZone, Utc};

    async fn setup() -> SqliteJobStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteJobStore::new(db.pool().clone())
    }

    fn job(profile_id: i64, purpose: JobPurpose, hour: u32) -> PendingJob {
        PendingJob {
            profile_id: ProfileId::new(profile_id),
            purpose,
            fire_at: Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn should_persist_and_list_slots() {
        let store = setup().await;
        store.upsert(job(1, JobPurpose::Start, 7)).await.unwrap();
        store.upsert(job(1, JobPurpose::End, 21)).await.unwrap();
        store.upsert(job(2, JobPurpose::Start, 9)).await.unwrap();

        let mut all = store.list_all().await.unwrap();
        all.sort_by_key(|j| (j.profile_id, j.purpose));
        assert_eq!(
            all,
            vec![
                job(1, JobPurpose::Start, 7),
                job(1, JobPurpose::End, 21),
                job(2, JobPurpose::Start, 9),
            ]
        );
    }

    #[tokio::test]
    async fn should_replace_slot_on_upsert_of_same_pair() {
        let store = setup().await;
        store.upsert(job(1, JobPurpose::Start, 7)).await.unwrap();
        store.upsert(job(1, JobPurpose::Start, 8)).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![job(1, JobPurpose::Start, 8)]);
    }

    #[tokio::test]
    async fn should_remove_only_the_named_pair() {
        let store = setup().await;
        store.upsert(job(1, JobPurpose::Start, 7)).await.unwrap();
        store.upsert(job(1, JobPurpose::End, 21)).await.unwrap();

        store
            .remove(ProfileId::new(1), JobPurpose::Start)
            .await
            .unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![job(1, JobPurpose::End, 21)]);
    }

    #[tokio::test]
    async fn should_remove_exact_only_while_instant_unchanged() {
        let store = setup().await;
        store.upsert(job(1, JobPurpose::Start, 7)).await.unwrap();

        // The pair was re-armed to a later instant in the meantime.
        store.upsert(job(1, JobPurpose::Start, 8)).await.unwrap();
        store.remove_exact(job(1, JobPurpose::Start, 7)).await.unwrap();
        assert_eq!(
            store.list_all().await.unwrap(),
            vec![job(1, JobPurpose::Start, 8)]
        );

        store.remove_exact(job(1, JobPurpose::Start, 8)).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_remove_of_absent_pair() {
        let store = setup().await;
        store
            .remove(ProfileId::new(9), JobPurpose::End)
            .await
            .unwrap();
    }
}
