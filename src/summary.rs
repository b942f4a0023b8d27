//! Daily summary generation for one station and UTC day.

use crate::error::SlotError;
use crate::model::{MeteorologicalEntry, NewDailySummary, WeatherObservation};
use crate::resolver::{self, Purpose, SlotInput};
use crate::store::SlotStore;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument};

/// Generate and persist the summary for the UTC day containing `utc_time`.
///
/// The slot at `utc_time` must have both cards and the day must not be
/// summarized yet; otherwise the resolver's error is returned unchanged.
#[instrument(skip_all, fields(station_id = %station_id, utc = %utc_time))]
pub async fn generate_daily_summary(
    store: &dyn SlotStore,
    station_id: &str,
    utc_time: DateTime<Utc>,
) -> Result<(i64, NewDailySummary), SlotError> {
    let resolution = resolver::resolve(
        store,
        station_id,
        &SlotInput::Instant(utc_time),
        Purpose::DailySummary,
    )
    .await?;
    let date = resolution.slot.utc_date();

    let (entries, observations) = tokio::try_join!(
        store.meteorological_entries_for_day(station_id, date),
        store.weather_observations_for_day(station_id, date),
    )?;

    let summary = aggregate(date, &entries, &observations);
    let id = store.create_daily_summary(station_id, &summary).await?;
    info!(id, observations = summary.observation_count, "daily summary saved");
    Ok((id, summary))
}

/// Fold a day's cards into summary values. Missing readings are skipped;
/// a value with no readings at all stays `None`.
///
/// The day's max/min come from the reported max/min thermometer readings.
/// Dry-bulb readings are used only when no entry of the day reports that
/// extreme at all; the two sources are never mixed.
pub fn aggregate(
    date: NaiveDate,
    entries: &[MeteorologicalEntry],
    observations: &[WeatherObservation],
) -> NewDailySummary {
    let max_temperature_c = extreme(entries, |e| e.max_temperature_c, f64::max);
    let min_temperature_c = extreme(entries, |e| e.min_temperature_c, f64::min);
    let rainfall: Vec<f64> = observations.iter().filter_map(|o| o.rainfall_mm).collect();

    NewDailySummary {
        summary_date: date,
        max_temperature_c,
        min_temperature_c,
        mean_station_pressure_hpa: mean(entries.iter().filter_map(|e| e.station_pressure_hpa)),
        mean_relative_humidity: mean(entries.iter().filter_map(|e| e.relative_humidity)),
        total_rainfall_mm: if rainfall.is_empty() {
            None
        } else {
            Some(rainfall.iter().sum())
        },
        observation_count: entries.len() as i64,
    }
}

fn extreme(
    entries: &[MeteorologicalEntry],
    reported: impl Fn(&MeteorologicalEntry) -> Option<f64>,
    pick: fn(f64, f64) -> f64,
) -> Option<f64> {
    entries
        .iter()
        .filter_map(&reported)
        .reduce(pick)
        .or_else(|| entries.iter().filter_map(|e| e.dry_bulb_c).reduce(pick))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(hour: u32, dry: Option<f64>, max: Option<f64>, min: Option<f64>) -> MeteorologicalEntry {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap();
        MeteorologicalEntry {
            id: i64::from(hour),
            station_id: "41923".into(),
            utc_time: at,
            dry_bulb_c: dry,
            wet_bulb_c: None,
            max_temperature_c: max,
            min_temperature_c: min,
            station_pressure_hpa: Some(1000.0 + f64::from(hour)),
            relative_humidity: None,
            submitted_by: None,
            created_at: at,
        }
    }

    fn observation(rain: Option<f64>) -> WeatherObservation {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        WeatherObservation {
            id: 1,
            station_id: "41923".into(),
            utc_time: at,
            total_cloud_oktas: None,
            visibility_km: None,
            rainfall_mm: rain,
            wind_direction_deg: None,
            wind_speed_kt: None,
            present_weather: None,
            submitted_by: None,
            created_at: at,
        }
    }

    #[test]
    fn aggregates_extremes_means_and_totals() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entries = vec![
            entry(0, Some(24.0), None, Some(21.5)),
            entry(6, Some(30.0), Some(33.0), None),
            entry(12, Some(28.0), None, None),
        ];
        let observations = vec![observation(Some(1.5)), observation(None), observation(Some(2.0))];

        let summary = aggregate(date, &entries, &observations);
        assert_eq!(summary.summary_date, date);
        assert_eq!(summary.max_temperature_c, Some(33.0));
        assert_eq!(summary.min_temperature_c, Some(21.5));
        assert_eq!(summary.mean_station_pressure_hpa, Some(1006.0));
        assert_eq!(summary.mean_relative_humidity, None);
        assert_eq!(summary.total_rainfall_mm, Some(3.5));
        assert_eq!(summary.observation_count, 3);
    }

    #[test]
    fn reported_extremes_are_not_mixed_with_dry_bulb() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entries = vec![
            entry(3, Some(26.0), Some(30.0), Some(19.0)),
            entry(9, Some(35.0), None, None),
            entry(21, Some(17.0), None, None),
        ];
        let summary = aggregate(date, &entries, &[]);
        assert_eq!(summary.max_temperature_c, Some(30.0));
        assert_eq!(summary.min_temperature_c, Some(19.0));
    }

    #[test]
    fn dry_bulb_stands_in_when_no_extremes_reported() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entries = vec![
            entry(0, Some(22.0), None, None),
            entry(6, Some(31.5), None, None),
            entry(12, None, None, None),
        ];
        let summary = aggregate(date, &entries, &[]);
        assert_eq!(summary.max_temperature_c, Some(31.5));
        assert_eq!(summary.min_temperature_c, Some(22.0));
    }

    #[test]
    fn empty_day_has_no_values() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let summary = aggregate(date, &[], &[]);
        assert_eq!(summary.max_temperature_c, None);
        assert_eq!(summary.total_rainfall_mm, None);
        assert_eq!(summary.observation_count, 0);
    }
}
