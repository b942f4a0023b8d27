use super::repo::{self, Pool};
use crate::model::{
    DailySummary, MeteorologicalEntry, NewDailySummary, NewMeteorologicalEntry, NewSynopticCode,
    NewWeatherObservation, ObservationSlot, RecordKind, SynopticCode, WeatherObservation,
};
use crate::store::{SlotStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool,
}

impl SqliteStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

/// Map a failed insert: unique violations become `Conflict`, anything else
/// stays a backend error with its cause.
fn classify_insert(kind: RecordKind, err: anyhow::Error) -> StoreError {
    let unique = matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    );
    if unique {
        StoreError::Conflict(kind)
    } else {
        StoreError::Backend(err)
    }
}

#[async_trait]
impl SlotStore for SqliteStore {
    async fn meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>> {
        Ok(repo::find_meteorological_entry(&self.pool, station_id, utc_time).await?)
    }

    async fn weather_observation(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<WeatherObservation>> {
        Ok(repo::find_weather_observation(&self.pool, station_id, utc_time).await?)
    }

    async fn synoptic_code(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<SynopticCode>> {
        Ok(repo::find_synoptic_code(&self.pool, station_id, utc_time).await?)
    }

    async fn daily_summary(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<DailySummary>> {
        Ok(repo::find_daily_summary(&self.pool, station_id, utc_time.date_naive()).await?)
    }

    async fn previous_day_meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>> {
        let Some(previous) = utc_time.date_naive().pred_opt() else {
            return Ok(None);
        };
        Ok(repo::latest_meteorological_entry_on(&self.pool, station_id, previous).await?)
    }

    async fn meteorological_entries_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<MeteorologicalEntry>> {
        Ok(repo::list_meteorological_entries(&self.pool, station_id, date).await?)
    }

    async fn weather_observations_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<WeatherObservation>> {
        Ok(repo::list_weather_observations(&self.pool, station_id, date).await?)
    }

    async fn create_meteorological_entry(
        &self,
        slot: &ObservationSlot,
        entry: &NewMeteorologicalEntry,
    ) -> StoreResult<i64> {
        repo::insert_meteorological_entry(&self.pool, slot, entry)
            .await
            .map_err(|err| classify_insert(RecordKind::MeteorologicalEntry, err))
    }

    async fn create_weather_observation(
        &self,
        slot: &ObservationSlot,
        observation: &NewWeatherObservation,
    ) -> StoreResult<i64> {
        repo::insert_weather_observation(&self.pool, slot, observation)
            .await
            .map_err(|err| classify_insert(RecordKind::WeatherObservation, err))
    }

    async fn create_synoptic_code(
        &self,
        slot: &ObservationSlot,
        code: &NewSynopticCode,
    ) -> StoreResult<i64> {
        repo::insert_synoptic_code(&self.pool, slot, code)
            .await
            .map_err(|err| classify_insert(RecordKind::SynopticCode, err))
    }

    async fn create_daily_summary(
        &self,
        station_id: &str,
        summary: &NewDailySummary,
    ) -> StoreResult<i64> {
        repo::insert_daily_summary(&self.pool, station_id, summary)
            .await
            .map_err(|err| classify_insert(RecordKind::DailySummary, err))
    }
}
