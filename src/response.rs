//! JSON shape returned to the form layer after an hour selection.
//!
//! A call produces either a resolved body or `{ "error": true, "message" }`.

use crate::error::SlotError;
use crate::local_time::LocalProjector;
use crate::model::{SlotCompletenessState, SlotStage};
use crate::resolver::{NextForm, Resolution};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotResponse {
    Resolved(ResolvedBody),
    Failed(ErrorBody),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBody {
    pub found: bool,
    pub message: String,
    #[serde(flatten)]
    pub state: SlotCompletenessState,
    pub next_form: NextForm,
    pub stage: SlotStage,
    pub station_id: String,
    pub hour: String,
    pub utc_time: DateTime<Utc>,
    pub local_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
}

impl ErrorBody {
    /// Log the error (with cause for infrastructure failures) and keep only
    /// the user-facing message.
    pub fn from_error(err: &SlotError) -> Self {
        match err {
            SlotError::StorageUnavailable(cause) => {
                error!(?cause, "storage unavailable while resolving slot")
            }
            SlotError::InvalidTimestamp(detail) => error!(%detail, "invalid timestamp"),
            other => warn!(error = %other, "slot request rejected"),
        }
        Self {
            error: true,
            message: err.user_message(),
        }
    }
}

impl SlotResponse {
    pub fn from_outcome(outcome: Result<Resolution, SlotError>, projector: &LocalProjector) -> Self {
        match outcome.and_then(|resolution| resolved(resolution, projector)) {
            Ok(body) => SlotResponse::Resolved(body),
            Err(err) => SlotResponse::Failed(ErrorBody::from_error(&err)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SlotResponse::Failed(_))
    }

    pub fn message(&self) -> &str {
        match self {
            SlotResponse::Resolved(body) => &body.message,
            SlotResponse::Failed(body) => &body.message,
        }
    }
}

fn resolved(resolution: Resolution, projector: &LocalProjector) -> Result<ResolvedBody, SlotError> {
    let local_time = resolution.slot.local_instant(projector)?;
    let found = resolution.found();
    let stage = resolution.stage();
    Ok(ResolvedBody {
        found,
        message: resolution.message,
        state: resolution.state,
        next_form: resolution.next_form,
        stage,
        hour: resolution.slot.hour_code(),
        station_id: resolution.slot.station_id,
        utc_time: resolution.slot.utc_instant,
        local_time,
    })
}
