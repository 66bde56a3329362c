//! `simulate` command: directory snapshot in, training tables out.

use std::io::Write;

use camino::Utf8PathBuf;
use chargewise_data::{
    CityBatch, DatasetSummary, NormaliseReport, SimulationConfig, normalise_cities,
    simulate_dataset,
};
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::files::{
    BOOKINGS_FILE, STATIONS_FILE, USERS_FILE, emit, read_json, require_existing, write_json,
};
use crate::{ARG_OUTPUT_DIR, ARG_SNAPSHOT, CliError, ENV_SNAPSHOT};

const DEFAULT_OUTPUT_DIR: &str = "data";

/// CLI arguments for the `simulate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Normalise a snapshot of charging-directory records, then \
                 simulate station conditions, users and bookings. Writes \
                 stations.json, users.json and bookings.json to the output \
                 directory and prints a dataset summary.",
    about = "Build synthetic training tables from a directory snapshot"
)]
#[ortho_config(prefix = "CHARGEWISE")]
pub(crate) struct SimulateArgs {
    /// JSON array of city batches (`name`, `latitude`, `longitude`, `records`).
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Directory receiving the generated tables.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Number of synthetic users.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) users: Option<usize>,
    /// Booking attempts per user.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) bookings_per_user: Option<usize>,
    /// Seed for every simulated draw.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl SimulateArgs {
    fn into_config(self) -> Result<SimulateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SimulateConfig::try_from(merged)
    }
}

/// Resolved `simulate` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimulateConfig {
    pub(crate) snapshot: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) simulation: SimulationConfig,
}

impl TryFrom<SimulateArgs> for SimulateConfig {
    type Error = CliError;

    fn try_from(args: SimulateArgs) -> Result<Self, Self::Error> {
        let snapshot = args.snapshot.ok_or(CliError::MissingArgument {
            field: ARG_SNAPSHOT,
            env: ENV_SNAPSHOT,
        })?;
        let defaults = SimulationConfig::default();
        Ok(Self {
            snapshot,
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            simulation: SimulationConfig {
                users: args.users.unwrap_or(defaults.users),
                bookings_per_user: args.bookings_per_user.unwrap_or(defaults.bookings_per_user),
                seed: args.seed.unwrap_or(defaults.seed),
                ..defaults
            },
        })
    }
}

/// What `simulate` prints.
#[derive(Debug, Serialize)]
pub(crate) struct SimulateReport {
    pub(crate) normalisation: NormaliseReport,
    pub(crate) summary: DatasetSummary,
}

pub(crate) fn run_simulate(args: SimulateArgs, output: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.snapshot, ARG_SNAPSHOT)?;
    execute_simulate(&config, Utc::now().naive_utc(), output)
}

pub(crate) fn execute_simulate(
    config: &SimulateConfig,
    reference_time: NaiveDateTime,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    let batches: Vec<CityBatch> = read_json(&config.snapshot)?;
    let (stations, normalisation) = normalise_cities(&batches);
    let dataset = simulate_dataset(stations, &config.simulation, reference_time)?;

    write_json(&config.output_dir.join(STATIONS_FILE), &dataset.stations)?;
    write_json(&config.output_dir.join(USERS_FILE), &dataset.users)?;
    write_json(&config.output_dir.join(BOOKINGS_FILE), &dataset.bookings)?;
    info!("wrote simulated tables to {}", config.output_dir);

    emit(
        output,
        &SimulateReport {
            normalisation,
            summary: DatasetSummary::from_dataset(&dataset),
        },
    )
}
