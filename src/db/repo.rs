use crate::hour;
use crate::model::{
    DailySummary, MeteorologicalEntry, NewDailySummary, NewMeteorologicalEntry, NewSynopticCode,
    NewWeatherObservation, ObservationSlot, SynopticCode, WeatherObservation,
};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{instrument, warn};

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized)
        .await
        .with_context(|| format!("failed to open database {normalized}"))?;
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// Normalize a file-backed SQLite URL to `sqlite://<path>`: expand a leading
/// `~/` and create the parent directory. Other URLs pass through unchanged.
pub(crate) fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return url.to_string();
    }

    let path = match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path.to_string(),
    };
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %err, "failed to create database directory");
            }
        }
    }

    match query {
        Some(q) => format!("sqlite://{path}?{q}"),
        None => format!("sqlite://{path}"),
    }
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn find_meteorological_entry(
    pool: &Pool,
    station_id: &str,
    utc_time: DateTime<Utc>,
) -> Result<Option<MeteorologicalEntry>> {
    let row = sqlx::query_as::<_, MeteorologicalEntry>(
        "SELECT * FROM meteorological_entries WHERE station_id = ? AND utc_time = ?",
    )
    .bind(station_id)
    .bind(utc_time)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn find_weather_observation(
    pool: &Pool,
    station_id: &str,
    utc_time: DateTime<Utc>,
) -> Result<Option<WeatherObservation>> {
    let row = sqlx::query_as::<_, WeatherObservation>(
        "SELECT * FROM weather_observations WHERE station_id = ? AND utc_time = ?",
    )
    .bind(station_id)
    .bind(utc_time)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn find_synoptic_code(
    pool: &Pool,
    station_id: &str,
    utc_time: DateTime<Utc>,
) -> Result<Option<SynopticCode>> {
    let row = sqlx::query_as::<_, SynopticCode>(
        "SELECT * FROM synoptic_codes WHERE station_id = ? AND utc_time = ?",
    )
    .bind(station_id)
    .bind(utc_time)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn find_daily_summary(
    pool: &Pool,
    station_id: &str,
    date: NaiveDate,
) -> Result<Option<DailySummary>> {
    let row = sqlx::query_as::<_, DailySummary>(
        "SELECT * FROM daily_summaries WHERE station_id = ? AND summary_date = ?",
    )
    .bind(station_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Latest first card of the station on `date`.
#[instrument(skip_all)]
pub async fn latest_meteorological_entry_on(
    pool: &Pool,
    station_id: &str,
    date: NaiveDate,
) -> Result<Option<MeteorologicalEntry>> {
    let (start, end) = day_bounds(date)?;
    let row = sqlx::query_as::<_, MeteorologicalEntry>(
        "SELECT * FROM meteorological_entries \
         WHERE station_id = ? AND utc_time >= ? AND utc_time < ? \
         ORDER BY utc_time DESC LIMIT 1",
    )
    .bind(station_id)
    .bind(start)
    .bind(end)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn list_meteorological_entries(
    pool: &Pool,
    station_id: &str,
    date: NaiveDate,
) -> Result<Vec<MeteorologicalEntry>> {
    let (start, end) = day_bounds(date)?;
    let rows = sqlx::query_as::<_, MeteorologicalEntry>(
        "SELECT * FROM meteorological_entries \
         WHERE station_id = ? AND utc_time >= ? AND utc_time < ? ORDER BY utc_time ASC",
    )
    .bind(station_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn list_weather_observations(
    pool: &Pool,
    station_id: &str,
    date: NaiveDate,
) -> Result<Vec<WeatherObservation>> {
    let (start, end) = day_bounds(date)?;
    let rows = sqlx::query_as::<_, WeatherObservation>(
        "SELECT * FROM weather_observations \
         WHERE station_id = ? AND utc_time >= ? AND utc_time < ? ORDER BY utc_time ASC",
    )
    .bind(station_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn insert_meteorological_entry(
    pool: &Pool,
    slot: &ObservationSlot,
    entry: &NewMeteorologicalEntry,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO meteorological_entries \
         (station_id, utc_time, dry_bulb_c, wet_bulb_c, max_temperature_c, min_temperature_c, \
          station_pressure_hpa, relative_humidity, submitted_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&slot.station_id)
    .bind(slot.utc_instant)
    .bind(entry.dry_bulb_c)
    .bind(entry.wet_bulb_c)
    .bind(entry.max_temperature_c)
    .bind(entry.min_temperature_c)
    .bind(entry.station_pressure_hpa)
    .bind(entry.relative_humidity)
    .bind(entry.submitted_by.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[instrument(skip_all)]
pub async fn insert_weather_observation(
    pool: &Pool,
    slot: &ObservationSlot,
    observation: &NewWeatherObservation,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO weather_observations \
         (station_id, utc_time, total_cloud_oktas, visibility_km, rainfall_mm, \
          wind_direction_deg, wind_speed_kt, present_weather, submitted_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&slot.station_id)
    .bind(slot.utc_instant)
    .bind(observation.total_cloud_oktas)
    .bind(observation.visibility_km)
    .bind(observation.rainfall_mm)
    .bind(observation.wind_direction_deg)
    .bind(observation.wind_speed_kt)
    .bind(observation.present_weather.as_deref())
    .bind(observation.submitted_by.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[instrument(skip_all)]
pub async fn insert_synoptic_code(
    pool: &Pool,
    slot: &ObservationSlot,
    code: &NewSynopticCode,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO synoptic_codes (station_id, utc_time, code) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&slot.station_id)
    .bind(slot.utc_instant)
    .bind(code.code.trim())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[instrument(skip_all)]
pub async fn insert_daily_summary(
    pool: &Pool,
    station_id: &str,
    summary: &NewDailySummary,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO daily_summaries \
         (station_id, summary_date, max_temperature_c, min_temperature_c, \
          mean_station_pressure_hpa, mean_relative_humidity, total_rainfall_mm, observation_count) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(station_id)
    .bind(summary.summary_date)
    .bind(summary.max_temperature_c)
    .bind(summary.min_temperature_c)
    .bind(summary.mean_station_pressure_hpa)
    .bind(summary.mean_relative_humidity)
    .bind(summary.total_rainfall_mm)
    .bind(summary.observation_count)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Half-open `[midnight, next midnight)` UTC range of `date`.
fn day_bounds(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date
        .succ_opt()
        .with_context(|| format!("no day after {date}"))?;
    Ok((hour::day_start(date), hour::day_start(next)))
}
