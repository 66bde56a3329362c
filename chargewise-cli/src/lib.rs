//! Command-line interface for Chargewise.
//!
//! `simulate` turns a directory snapshot into synthetic training tables,
//! `train` and `compare` fit models on those tables, and `recommend`
//! serves one JSON request from stdin to stdout. Logs go to stderr so
//! stdout only ever carries JSON.
#![forbid(unsafe_code)]

use std::io::{Read, Write};

use clap::{Parser, Subcommand};

mod error;
mod files;
mod recommend;
mod simulate;
mod train;

pub use error::CliError;

use recommend::RecommendArgs;
use simulate::SimulateArgs;
use train::{CompareArgs, TrainArgs};

const ARG_SNAPSHOT: &str = "snapshot";
const ARG_OUTPUT_DIR: &str = "output-dir";
const ARG_DATA_DIR: &str = "data-dir";
const ARG_ARTIFACT: &str = "artifact";
const ARG_TOP_K: &str = "top-k";
const ARG_DEFAULT_BATTERY: &str = "default-battery-kwh";
const ENV_SNAPSHOT: &str = "CHARGEWISE_CMDS_SIMULATE_SNAPSHOT";
const ENV_TRAIN_DATA_DIR: &str = "CHARGEWISE_CMDS_TRAIN_DATA_DIR";
const ENV_COMPARE_DATA_DIR: &str = "CHARGEWISE_CMDS_COMPARE_DATA_DIR";

/// Run the Chargewise CLI with the current process arguments, stdin and
/// stdout.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid or the command fails.
/// Nothing is written to stdout in that case.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdin, &mut stdout)
}

fn dispatch(
    command: Command,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Simulate(args) => simulate::run_simulate(args, output),
        Command::Train(args) => train::run_train(args, output),
        Command::Compare(args) => train::run_compare(args, output),
        Command::Recommend(args) => recommend::run_recommend(args, input, output),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "chargewise",
    about = "Simulate, train and serve EV charging-station recommendations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalise a directory snapshot and simulate users and bookings.
    Simulate(SimulateArgs),
    /// Train one model on simulated bookings and save its artefact.
    Train(TrainArgs),
    /// Train every model kind on the same split and report the winner.
    Compare(CompareArgs),
    /// Rank the stations of one JSON request read from stdin.
    Recommend(RecommendArgs),
}

#[cfg(test)]
mod tests;
