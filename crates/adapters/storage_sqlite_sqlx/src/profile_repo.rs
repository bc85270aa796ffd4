//! `SQLite` implementation of [`ProfileRepository`].

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tokio::sync::watch;

use airsched_app::ports::ProfileRepository;
use airsched_domain::control::{ControlState, Zone};
use airsched_domain::error::AirschedError;
use airsched_domain::id::ProfileId;
use airsched_domain::profile::ScheduleProfile;
use airsched_domain::time::TimeOfDay;

use crate::error::StorageError;

struct Wrapper(ScheduleProfile);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ScheduleProfile> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let start_time: String = row.try_get("start_time")?;
        let end_time: Option<String> = row.try_get("end_time")?;
        let control_json: String = row.try_get("control")?;
        let zones_json: String = row.try_get("zones")?;
        let is_active: bool = row.try_get("is_active")?;

        let start_time =
            TimeOfDay::from_str(&start_time).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let end_time = end_time
            .map(|s| TimeOfDay::from_str(&s).map_err(|err| sqlx::Error::Decode(Box::new(err))))
            .transpose()?;
        let control: ControlState = serde_json::from_str(&control_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let zones: Vec<Zone> = serde_json::from_str(&zones_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(ScheduleProfile {
            id: ProfileId::new(id),
            start_time,
            end_time,
            control,
            zones,
            is_active,
        }))
    }
}

/// `SQLite`-backed profile repository.
///
/// Cheap to clone; clones share the pool and the live-list channel.
#[derive(Clone)]
pub struct SqliteProfileRepository {
    pool: SqlitePool,
    all: Arc<watch::Sender<Vec<ScheduleProfile>>>,
}

impl SqliteProfileRepository {
    /// Create a new repository backed by the given connection pool.
    ///
    /// The live-list channel starts empty; call [`Self::refresh`] after
    /// construction to seed it from the database.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let (all, _) = watch::channel(Vec::new());
        Self {
            pool,
            all: Arc::new(all),
        }
    }

    /// Re-read the full profile list and publish it to subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`AirschedError::Storage`] if the query fails.
    pub async fn refresh(&self) -> Result<(), AirschedError> {
        let profiles = self.fetch_all().await?;
        self.all.send_replace(profiles);
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<ScheduleProfile>, AirschedError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM schedule_profiles ORDER BY start_time, id")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn create(&self, mut profile: ScheduleProfile) -> Result<ScheduleProfile, AirschedError> {
        let control_json = serde_json::to_string(&profile.control).map_err(StorageError::from)?;
        let zones_json = serde_json::to_string(&profile.zones).map_err(StorageError::from)?;
        let end_time = profile.end_time.map(|t| t.to_string());

        let result = sqlx::query(
            "INSERT INTO schedule_profiles (start_time, end_time, control, zones, is_active) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(profile.start_time.to_string())
        .bind(&end_time)
        .bind(&control_json)
        .bind(&zones_json)
        .bind(profile.is_active)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        profile.id = ProfileId::new(result.last_insert_rowid());
        self.refresh().await?;
        Ok(profile)
    }

    async fn get_by_id(&self, id: ProfileId) -> Result<Option<ScheduleProfile>, AirschedError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM schedule_profiles WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<ScheduleProfile>, AirschedError> {
        self.fetch_all().await
    }

    async fn update(&self, profile: ScheduleProfile) -> Result<ScheduleProfile, AirschedError> {
        let control_json = serde_json::to_string(&profile.control).map_err(StorageError::from)?;
        let zones_json = serde_json::to_string(&profile.zones).map_err(StorageError::from)?;
        let end_time = profile.end_time.map(|t| t.to_string());

        sqlx::query(
            "UPDATE schedule_profiles SET start_time = ?, end_time = ?, control = ?, zones = ?, is_active = ? WHERE id = ?",
        )
        .bind(profile.start_time.to_string())
        .bind(&end_time)
        .bind(&control_json)
        .bind(&zones_json)
        .bind(profile.is_active)
        .bind(profile.id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        self.refresh().await?;
        Ok(profile)
    }

    async fn delete(&self, id: ProfileId) -> Result<(), AirschedError> {
        sqlx::query("DELETE FROM schedule_profiles WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        self.refresh().await?;
        Ok(())
    }

    fn subscribe_all(&self) -> watch::Receiver<Vec<ScheduleProfile>> {
        self.all.subscribe()
    }
}
