//! Storage collaborator contract.
//!
//! The resolver only observes whether records exist; persistence is owned by
//! the implementor. Uniqueness per (station, slot, kind) must be enforced
//! here, the core gives no at-most-once guarantee of its own.

use crate::model::{
    DailySummary, MeteorologicalEntry, NewDailySummary, NewMeteorologicalEntry, NewSynopticCode,
    NewWeatherObservation, ObservationSlot, RecordKind, SynopticCode, WeatherObservation,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists for this slot")]
    Conflict(RecordKind),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            StoreError::Backend(err) => err,
            other => anyhow::Error::new(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>>;

    async fn weather_observation(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<WeatherObservation>>;

    async fn synoptic_code(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<SynopticCode>>;

    /// Summary for the UTC calendar day containing `utc_time`.
    async fn daily_summary(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<DailySummary>>;

    /// Latest first card on the UTC day before the one containing `utc_time`.
    async fn previous_day_meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>>;

    async fn meteorological_entries_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<MeteorologicalEntry>>;

    async fn weather_observations_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<WeatherObservation>>;

    async fn create_meteorological_entry(
        &self,
        slot: &ObservationSlot,
        entry: &NewMeteorologicalEntry,
    ) -> StoreResult<i64>;

    async fn create_weather_observation(
        &self,
        slot: &ObservationSlot,
        observation: &NewWeatherObservation,
    ) -> StoreResult<i64>;

    async fn create_synoptic_code(
        &self,
        slot: &ObservationSlot,
        code: &NewSynopticCode,
    ) -> StoreResult<i64>;

    async fn create_daily_summary(
        &self,
        station_id: &str,
        summary: &NewDailySummary,
    ) -> StoreResult<i64>;
}
