use crate::error::SlotError;
use crate::hour;
use crate::local_time::LocalProjector;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    MeteorologicalEntry,
    WeatherObservation,
    SynopticCode,
    DailySummary,
}

impl RecordKind {
    fn as_str(&self) -> &'static str {
        match self {
            RecordKind::MeteorologicalEntry => "meteorological_entry",
            RecordKind::WeatherObservation => "weather_observation",
            RecordKind::SynopticCode => "synoptic_code",
            RecordKind::DailySummary => "daily_summary",
        }
    }

    pub fn duplicate_message(&self) -> &'static str {
        match self {
            RecordKind::MeteorologicalEntry => "Meteorological entry already exists for this hour.",
            RecordKind::WeatherObservation => "Weather observation already exists for this hour.",
            RecordKind::SynopticCode => "Synoptic code already exists for this hour.",
            RecordKind::DailySummary => "Daily summary already exists for this day.",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reporting opportunity: a station and a UTC hour.
///
/// The local time is always derived from `utc_instant`; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationSlot {
    pub station_id: String,
    pub utc_instant: DateTime<Utc>,
}

impl ObservationSlot {
    /// Builds a slot, truncating `utc_instant` to the hour.
    pub fn new(station_id: impl Into<String>, utc_instant: DateTime<Utc>) -> Self {
        Self {
            station_id: station_id.into(),
            utc_instant: hour::truncate_to_hour(utc_instant),
        }
    }

    pub fn local_instant(&self, projector: &LocalProjector) -> Result<NaiveDateTime, SlotError> {
        projector.to_local(&self.utc_instant)
    }

    pub fn utc_date(&self) -> NaiveDate {
        self.utc_instant.date_naive()
    }

    pub fn hour_code(&self) -> String {
        hour::decode(&self.utc_instant)
    }
}

/// First card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MeteorologicalEntry {
    pub id: i64,
    pub station_id: String,
    pub utc_time: DateTime<Utc>,
    pub dry_bulb_c: Option<f64>,
    pub wet_bulb_c: Option<f64>,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub station_pressure_hpa: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMeteorologicalEntry {
    pub dry_bulb_c: Option<f64>,
    pub wet_bulb_c: Option<f64>,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub station_pressure_hpa: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub submitted_by: Option<String>,
}

/// Second card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub id: i64,
    pub station_id: String,
    pub utc_time: DateTime<Utc>,
    pub total_cloud_oktas: Option<i64>,
    pub visibility_km: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub wind_direction_deg: Option<i64>,
    pub wind_speed_kt: Option<f64>,
    pub present_weather: Option<String>,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewWeatherObservation {
    pub total_cloud_oktas: Option<i64>,
    pub visibility_km: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub wind_direction_deg: Option<i64>,
    pub wind_speed_kt: Option<f64>,
    pub present_weather: Option<String>,
    pub submitted_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SynopticCode {
    pub id: i64,
    pub station_id: String,
    pub utc_time: DateTime<Utc>,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSynopticCode {
    pub code: String,
}

/// Aggregate of one station's UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub id: i64,
    pub station_id: String,
    pub summary_date: NaiveDate,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub mean_station_pressure_hpa: Option<f64>,
    pub mean_relative_humidity: Option<f64>,
    pub total_rainfall_mm: Option<f64>,
    pub observation_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailySummary {
    pub summary_date: NaiveDate,
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub mean_station_pressure_hpa: Option<f64>,
    pub mean_relative_humidity: Option<f64>,
    pub total_rainfall_mm: Option<f64>,
    pub observation_count: i64,
}

/// Which dependent records exist for one slot. Computed per query, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCompletenessState {
    pub has_meteorological_entry: bool,
    pub has_weather_observation: bool,
    pub has_synoptic_code: bool,
    pub has_daily_summary: bool,
    /// Read-only snapshot of the station's latest entry on the previous UTC day.
    pub previous_day_entry: Option<MeteorologicalEntry>,
}

impl SlotCompletenessState {
    /// Furthest stage reached along the card chain. A later record without its
    /// predecessor does not advance the stage.
    pub fn stage(&self) -> SlotStage {
        match (
            self.has_meteorological_entry,
            self.has_weather_observation,
            self.has_daily_summary,
        ) {
            (false, _, _) => SlotStage::Empty,
            (true, false, _) => SlotStage::FirstCardDone,
            (true, true, false) => SlotStage::BothCardsDone,
            (true, true, true) => SlotStage::SummaryDone,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SlotStage {
    Empty,
    FirstCardDone,
    BothCardsDone,
    SummaryDone,
}
