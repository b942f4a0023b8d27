//! Card submission.
//!
//! The card chain is enforced here rather than in storage: a second card needs
//! its first card, a synoptic code needs the second card. Duplicate protection
//! relies on the store's uniqueness constraint.

use crate::error::SlotError;
use crate::model::{NewMeteorologicalEntry, NewSynopticCode, NewWeatherObservation, ObservationSlot};
use crate::store::SlotStore;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

const FIRST_CARD_REQUIRED: &str =
    "A meteorological entry (first card) is required before the weather observation.";
const SECOND_CARD_REQUIRED: &str =
    "A weather observation (second card) is required before the synoptic code.";

/// Decode a JSON card payload. Malformed input is a validation error, not a
/// failure of the call.
pub fn parse_payload<T: DeserializeOwned>(payload: &str) -> Result<T, SlotError> {
    serde_json::from_str(payload).map_err(|err| SlotError::InvalidPayload(err.to_string()))
}

#[instrument(skip_all, fields(station_id = %slot.station_id, utc = %slot.utc_instant))]
pub async fn submit_first_card(
    store: &dyn SlotStore,
    slot: &ObservationSlot,
    entry: &NewMeteorologicalEntry,
) -> Result<i64, SlotError> {
    let id = store.create_meteorological_entry(slot, entry).await?;
    info!(id, "first card saved");
    Ok(id)
}

#[instrument(skip_all, fields(station_id = %slot.station_id, utc = %slot.utc_instant))]
pub async fn submit_second_card(
    store: &dyn SlotStore,
    slot: &ObservationSlot,
    observation: &NewWeatherObservation,
) -> Result<i64, SlotError> {
    if store
        .meteorological_entry(&slot.station_id, slot.utc_instant)
        .await?
        .is_none()
    {
        return Err(SlotError::MissingDependency(FIRST_CARD_REQUIRED.to_string()));
    }
    let id = store.create_weather_observation(slot, observation).await?;
    info!(id, "second card saved");
    Ok(id)
}

#[instrument(skip_all, fields(station_id = %slot.station_id, utc = %slot.utc_instant))]
pub async fn submit_synoptic_code(
    store: &dyn SlotStore,
    slot: &ObservationSlot,
    code: &NewSynopticCode,
) -> Result<i64, SlotError> {
    if code.code.trim().is_empty() {
        return Err(SlotError::InvalidPayload(
            "synoptic code must not be empty".to_string(),
        ));
    }
    if store
        .weather_observation(&slot.station_id, slot.utc_instant)
        .await?
        .is_none()
    {
        return Err(SlotError::MissingDependency(SECOND_CARD_REQUIRED.to_string()));
    }
    let id = store.create_synoptic_code(slot, code).await?;
    info!(id, "synoptic code saved");
    Ok(id)
}
