#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use synop_desk::model::{
    DailySummary, MeteorologicalEntry, NewDailySummary, NewMeteorologicalEntry, NewSynopticCode,
    NewWeatherObservation, ObservationSlot, RecordKind, SynopticCode, WeatherObservation,
};
use synop_desk::store::{SlotStore, StoreError, StoreResult};
use tokio::sync::Mutex;

pub const STATION: &str = "41923";

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn slot(day: u32, hour: u32) -> ObservationSlot {
    ObservationSlot::new(STATION, at(day, hour))
}

/// In-memory store honoring the same uniqueness rules as the SQLite schema.
/// `fail_reads` makes every lookup return a backend error.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Vec<MeteorologicalEntry>>>,
    observations: Arc<Mutex<Vec<WeatherObservation>>>,
    codes: Arc<Mutex<Vec<SynopticCode>>>,
    summaries: Arc<Mutex<Vec<DailySummary>>>,
    next_id: Arc<AtomicI64>,
    fail_reads: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn read(&self) -> StoreResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow!("connection refused")));
        }
        Ok(())
    }

    pub async fn seed_first_card(&self, slot: &ObservationSlot, dry_bulb_c: f64) {
        self.create_meteorological_entry(
            slot,
            &NewMeteorologicalEntry {
                dry_bulb_c: Some(dry_bulb_c),
                station_pressure_hpa: Some(1008.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    pub async fn seed_second_card(&self, slot: &ObservationSlot, rainfall_mm: f64) {
        self.create_weather_observation(
            slot,
            &NewWeatherObservation {
                rainfall_mm: Some(rainfall_mm),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }
}

fn same_slot(station: &str, utc: DateTime<Utc>, s: &str, u: DateTime<Utc>) -> bool {
    station == s && utc == u
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>> {
        self.read()?;
        let rows = self.entries.lock().await;
        Ok(rows
            .iter()
            .find(|e| same_slot(&e.station_id, e.utc_time, station_id, utc_time))
            .cloned())
    }

    async fn weather_observation(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<WeatherObservation>> {
        self.read()?;
        let rows = self.observations.lock().await;
        Ok(rows
            .iter()
            .find(|o| same_slot(&o.station_id, o.utc_time, station_id, utc_time))
            .cloned())
    }

    async fn synoptic_code(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<SynopticCode>> {
        self.read()?;
        let rows = self.codes.lock().await;
        Ok(rows
            .iter()
            .find(|c| same_slot(&c.station_id, c.utc_time, station_id, utc_time))
            .cloned())
    }

    async fn daily_summary(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<DailySummary>> {
        self.read()?;
        let rows = self.summaries.lock().await;
        Ok(rows
            .iter()
            .find(|s| s.station_id == station_id && s.summary_date == utc_time.date_naive())
            .cloned())
    }

    async fn previous_day_meteorological_entry(
        &self,
        station_id: &str,
        utc_time: DateTime<Utc>,
    ) -> StoreResult<Option<MeteorologicalEntry>> {
        self.read()?;
        let previous = utc_time.date_naive().pred_opt();
        let rows = self.entries.lock().await;
        Ok(rows
            .iter()
            .filter(|e| e.station_id == station_id && Some(e.utc_time.date_naive()) == previous)
            .max_by_key(|e| e.utc_time)
            .cloned())
    }

    async fn meteorological_entries_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<MeteorologicalEntry>> {
        self.read()?;
        let rows = self.entries.lock().await;
        Ok(rows
            .iter()
            .filter(|e| e.station_id == station_id && e.utc_time.date_naive() == date)
            .cloned()
            .collect())
    }

    async fn weather_observations_for_day(
        &self,
        station_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<WeatherObservation>> {
        self.read()?;
        let rows = self.observations.lock().await;
        Ok(rows
            .iter()
            .filter(|o| o.station_id == station_id && o.utc_time.date_naive() == date)
            .cloned()
            .collect())
    }

    async fn create_meteorological_entry(
        &self,
        slot: &ObservationSlot,
        entry: &NewMeteorologicalEntry,
    ) -> StoreResult<i64> {
        let mut rows = self.entries.lock().await;
        if rows
            .iter()
            .any(|e| same_slot(&e.station_id, e.utc_time, &slot.station_id, slot.utc_instant))
        {
            return Err(StoreError::Conflict(RecordKind::MeteorologicalEntry));
        }
        let id = self.id();
        rows.push(MeteorologicalEntry {
            id,
            station_id: slot.station_id.clone(),
            utc_time: slot.utc_instant,
            dry_bulb_c: entry.dry_bulb_c,
            wet_bulb_c: entry.wet_bulb_c,
            max_temperature_c: entry.max_temperature_c,
            min_temperature_c: entry.min_temperature_c,
            station_pressure_hpa: entry.station_pressure_hpa,
            relative_humidity: entry.relative_humidity,
            submitted_by: entry.submitted_by.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn create_weather_observation(
        &self,
        slot: &ObservationSlot,
        observation: &NewWeatherObservation,
    ) -> StoreResult<i64> {
        let mut rows = self.observations.lock().await;
        if rows
            .iter()
            .any(|o| same_slot(&o.station_id, o.utc_time, &slot.station_id, slot.utc_instant))
        {
            return Err(StoreError::Conflict(RecordKind::WeatherObservation));
        }
        let id = self.id();
        rows.push(WeatherObservation {
            id,
            station_id: slot.station_id.clone(),
            utc_time: slot.utc_instant,
            total_cloud_oktas: observation.total_cloud_oktas,
            visibility_km: observation.visibility_km,
            rainfall_mm: observation.rainfall_mm,
            wind_direction_deg: observation.wind_direction_deg,
            wind_speed_kt: observation.wind_speed_kt,
            present_weather: observation.present_weather.clone(),
            submitted_by: observation.submitted_by.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn create_synoptic_code(
        &self,
        slot: &ObservationSlot,
        code: &NewSynopticCode,
    ) -> StoreResult<i64> {
        let mut rows = self.codes.lock().await;
        if rows
            .iter()
            .any(|c| same_slot(&c.station_id, c.utc_time, &slot.station_id, slot.utc_instant))
        {
            return Err(StoreError::Conflict(RecordKind::SynopticCode));
        }
        let id = self.id();
        rows.push(SynopticCode {
            id,
            station_id: slot.station_id.clone(),
            utc_time: slot.utc_instant,
            code: code.code.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn create_daily_summary(
        &self,
        station_id: &str,
        summary: &NewDailySummary,
    ) -> StoreResult<i64> {
        let mut rows = self.summaries.lock().await;
        if rows
            .iter()
            .any(|s| s.station_id == station_id && s.summary_date == summary.summary_date)
        {
            return Err(StoreError::Conflict(RecordKind::DailySummary));
        }
        let id = self.id();
        rows.push(DailySummary {
            id,
            station_id: station_id.to_string(),
            summary_date: summary.summary_date,
            max_temperature_c: summary.max_temperature_c,
            min_temperature_c: summary.min_temperature_c,
            mean_station_pressure_hpa: summary.mean_station_pressure_hpa,
            mean_relative_humidity: summary.mean_relative_humidity,
            total_rainfall_mm: summary.total_rainfall_mm,
            observation_count: summary.observation_count,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}
