//! Completeness resolver: decides which form an observer may fill next for a
//! (station, hour) slot.
//!
//! Every call queries storage afresh and holds no state, so concurrent
//! resolutions are independent and an abandoned one leaves nothing behind.

use crate::error::SlotError;
use crate::hour;
use crate::model::{ObservationSlot, RecordKind, SlotCompletenessState, SlotStage};
use crate::store::{SlotStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

pub const FIRST_CARD_MESSAGE: &str =
    "No meteorological entry found for this hour. Proceed to the first card.";
pub const SECOND_CARD_MESSAGE: &str =
    "Meteorological entry found for this hour. Proceed to the second card.";
pub const SUMMARY_ELIGIBLE_MESSAGE: &str =
    "Both cards are complete for this hour. The daily summary can be generated.";
pub const SUMMARY_MISSING_CARDS_MESSAGE: &str =
    "Both the first and second cards must be completed before generating the daily summary.";

/// How the caller identifies the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotInput {
    HourCode {
        code: String,
        reference_date: NaiveDate,
    },
    Instant(DateTime<Utc>),
}

impl SlotInput {
    /// Hour code anchored to the current UTC date.
    pub fn hour_today(code: impl Into<String>) -> Self {
        SlotInput::HourCode {
            code: code.into(),
            reference_date: Utc::now().date_naive(),
        }
    }

    pub fn resolve(&self) -> Result<DateTime<Utc>, SlotError> {
        match self {
            SlotInput::HourCode {
                code,
                reference_date,
            } => hour::encode(code, *reference_date),
            SlotInput::Instant(at) => Ok(hour::truncate_to_hour(*at)),
        }
    }
}

/// Why the slot is being checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Hour selection on the card entry forms.
    #[default]
    Observation,
    /// Eligibility check ahead of daily summary generation.
    DailySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextForm {
    FirstCard,
    SecondCard,
    DailySummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub slot: ObservationSlot,
    pub state: SlotCompletenessState,
    pub next_form: NextForm,
    pub message: String,
}

impl Resolution {
    /// Whether the first card exists for the slot.
    pub fn found(&self) -> bool {
        self.state.has_meteorological_entry
    }

    pub fn stage(&self) -> SlotStage {
        self.state.stage()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourOverview {
    pub hour: String,
    pub utc_time: DateTime<Utc>,
    pub stage: SlotStage,
}

fn unavailable(err: StoreError) -> SlotError {
    SlotError::StorageUnavailable(err.into_anyhow())
}

/// Existence of the four dependent records for `slot`. The previous-day
/// snapshot is left empty; [`resolve`] fills it only when it is needed.
#[instrument(skip_all, fields(station_id = %slot.station_id, utc = %slot.utc_instant))]
pub async fn completeness(
    store: &dyn SlotStore,
    slot: &ObservationSlot,
) -> Result<SlotCompletenessState, SlotError> {
    let station = slot.station_id.as_str();
    let at = slot.utc_instant;
    let (entry, observation, code, summary) = tokio::try_join!(
        store.meteorological_entry(station, at),
        store.weather_observation(station, at),
        store.synoptic_code(station, at),
        store.daily_summary(station, at),
    )
    .map_err(unavailable)?;

    Ok(SlotCompletenessState {
        has_meteorological_entry: entry.is_some(),
        has_weather_observation: observation.is_some(),
        has_synoptic_code: code.is_some(),
        has_daily_summary: summary.is_some(),
        previous_day_entry: None,
    })
}

/// Resolve the slot and apply the fixed decision order for `purpose`.
/// Exactly one outcome is produced per call.
#[instrument(skip_all, fields(station_id = %station_id, purpose = ?purpose))]
pub async fn resolve(
    store: &dyn SlotStore,
    station_id: &str,
    input: &SlotInput,
    purpose: Purpose,
) -> Result<Resolution, SlotError> {
    let utc_instant = input.resolve()?;
    let slot = ObservationSlot::new(station_id, utc_instant);
    let mut state = completeness(store, &slot).await?;

    let (next_form, message) = match purpose {
        Purpose::Observation => {
            if state.has_weather_observation {
                warn!(hour = %slot.hour_code(), "weather observation already recorded");
                return Err(SlotError::DuplicateSubmission(
                    RecordKind::WeatherObservation.duplicate_message().to_string(),
                ));
            }
            if state.has_meteorological_entry {
                state.previous_day_entry = store
                    .previous_day_meteorological_entry(station_id, slot.utc_instant)
                    .await
                    .map_err(unavailable)?;
                (NextForm::SecondCard, SECOND_CARD_MESSAGE)
            } else {
                (NextForm::FirstCard, FIRST_CARD_MESSAGE)
            }
        }
        Purpose::DailySummary => {
            if state.has_daily_summary {
                return Err(SlotError::DuplicateSubmission(
                    RecordKind::DailySummary.duplicate_message().to_string(),
                ));
            }
            if !(state.has_meteorological_entry && state.has_weather_observation) {
                return Err(SlotError::MissingDependency(
                    SUMMARY_MISSING_CARDS_MESSAGE.to_string(),
                ));
            }
            (NextForm::DailySummary, SUMMARY_ELIGIBLE_MESSAGE)
        }
    };

    info!(hour = %slot.hour_code(), next_form = ?next_form, "slot resolved");
    Ok(Resolution {
        slot,
        state,
        next_form,
        message: message.to_string(),
    })
}

/// Stage of every hour of `date` for one station.
#[instrument(skip_all, fields(station_id = %station_id, date = %date))]
pub async fn day_overview(
    store: &dyn SlotStore,
    station_id: &str,
    date: NaiveDate,
) -> Result<Vec<HourOverview>, SlotError> {
    let mut rows = Vec::with_capacity(24);
    for code in hour::hour_codes() {
        let utc_time = hour::encode(&code, date)?;
        let slot = ObservationSlot::new(station_id, utc_time);
        let state = completeness(store, &slot).await?;
        rows.push(HourOverview {
            hour: code,
            utc_time,
            stage: state.stage(),
        });
    }
    Ok(rows)
}
