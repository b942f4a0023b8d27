use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use synop_desk::config;
use synop_desk::db::{self, SqliteStore};
use synop_desk::entry;
use synop_desk::local_time;
use synop_desk::model::{NewMeteorologicalEntry, NewSynopticCode, NewWeatherObservation, ObservationSlot};
use synop_desk::resolver::{self, Purpose, SlotInput};
use synop_desk::response::{ErrorBody, SlotResponse};
use synop_desk::summary;
use synop_desk::SlotError;

#[derive(Debug, Parser)]
#[command(author, version, about = "Synoptic observation slot desk")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, ClapArgs)]
struct SlotArgs {
    /// Station identifier
    #[arg(long)]
    station: String,

    /// Observation hour code, "00".."23" (UTC)
    #[arg(long, required_unless_present = "at", conflicts_with = "at")]
    hour: Option<String>,

    /// UTC date the hour belongs to (defaults to today, UTC)
    #[arg(long, requires = "hour")]
    date: Option<NaiveDate>,

    /// Pre-resolved RFC 3339 instant instead of an hour code
    #[arg(long)]
    at: Option<String>,
}

impl SlotArgs {
    fn input(&self) -> Result<SlotInput, SlotError> {
        if let Some(at) = &self.at {
            return Ok(SlotInput::Instant(local_time::parse_utc(at)?));
        }
        let code = self.hour.clone().unwrap_or_default();
        Ok(match self.date {
            Some(reference_date) => SlotInput::HourCode {
                code,
                reference_date,
            },
            None => SlotInput::hour_today(code),
        })
    }

    fn slot(&self) -> Result<ObservationSlot, SlotError> {
        let at = self.input()?.resolve()?;
        Ok(ObservationSlot::new(self.station.clone(), at))
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report which form may be filled next for a slot
    Resolve {
        #[command(flatten)]
        slot: SlotArgs,
        /// Check daily summary eligibility instead of card entry
        #[arg(long)]
        summary: bool,
    },
    /// Submit the first card (meteorological entry) as JSON
    FirstCard {
        #[command(flatten)]
        slot: SlotArgs,
        #[arg(long)]
        payload: String,
    },
    /// Submit the second card (weather observation) as JSON
    SecondCard {
        #[command(flatten)]
        slot: SlotArgs,
        #[arg(long)]
        payload: String,
    },
    /// Submit the synoptic code for a slot
    Synoptic {
        #[command(flatten)]
        slot: SlotArgs,
        #[arg(long)]
        code: String,
    },
    /// Generate the daily summary for the slot's UTC day
    Summarize {
        #[command(flatten)]
        slot: SlotArgs,
    },
    /// Print the stage of every hour of a UTC day
    Overview {
        #[arg(long)]
        station: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome(outcome: Result<serde_json::Value, SlotError>) -> Result<()> {
    match outcome {
        Ok(value) => print_json(&value),
        Err(err) => print_json(&ErrorBody::from_error(&err)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;
    let store = SqliteStore::new(pool);
    let projector = cfg.projector();

    match args.command {
        Command::Resolve { slot, summary: for_summary } => {
            let purpose = if for_summary {
                Purpose::DailySummary
            } else {
                Purpose::Observation
            };
            let outcome = match slot.input() {
                Ok(input) => resolver::resolve(&store, &slot.station, &input, purpose).await,
                Err(err) => Err(err),
            };
            print_json(&SlotResponse::from_outcome(outcome, &projector))?;
        }
        Command::FirstCard { slot, payload } => {
            let parsed = entry::parse_payload::<NewMeteorologicalEntry>(&payload);
            let outcome = match (slot.slot(), parsed) {
                (Ok(s), Ok(card)) => entry::submit_first_card(&store, &s, &card).await,
                (Err(err), _) | (_, Err(err)) => Err(err),
            };
            print_outcome(outcome.map(|id| json!({ "id": id })))?;
        }
        Command::SecondCard { slot, payload } => {
            let parsed = entry::parse_payload::<NewWeatherObservation>(&payload);
            let outcome = match (slot.slot(), parsed) {
                (Ok(s), Ok(card)) => entry::submit_second_card(&store, &s, &card).await,
                (Err(err), _) | (_, Err(err)) => Err(err),
            };
            print_outcome(outcome.map(|id| json!({ "id": id })))?;
        }
        Command::Synoptic { slot, code } => {
            let outcome = match slot.slot() {
                Ok(s) => entry::submit_synoptic_code(&store, &s, &NewSynopticCode { code }).await,
                Err(err) => Err(err),
            };
            print_outcome(outcome.map(|id| json!({ "id": id })))?;
        }
        Command::Summarize { slot } => {
            let outcome = match slot.slot() {
                Ok(s) => summary::generate_daily_summary(&store, &s.station_id, s.utc_instant).await,
                Err(err) => Err(err),
            };
            print_outcome(outcome.map(|(id, generated)| json!({ "id": id, "summary": generated })))?;
        }
        Command::Overview { station, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            info!(%station, %date, "building day overview");
            let outcome = resolver::day_overview(&store, &station, date)
                .await
                .map(|rows| json!(rows));
            print_outcome(outcome)?;
        }
    }

    Ok(())
}
