//! `train` and `compare` commands.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chargewise_data::TrainingSet;
use chargewise_scorer::{
    ForestParams, Performance, RegressorKind, TrainingConfig, compare, train,
};
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::files::{STATIONS_FILE, emit, load_dataset, require_existing};
use crate::{ARG_ARTIFACT, ARG_DATA_DIR, CliError, ENV_COMPARE_DATA_DIR, ENV_TRAIN_DATA_DIR};

/// Artefact file name used when no path is configured.
pub(crate) const DEFAULT_ARTIFACT: &str = "model.bin";

/// CLI arguments for the `train` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Join the tables written by `simulate`, fit one regressor \
                 and save it as a versioned artefact. Prints the held-out \
                 evaluation.",
    about = "Train a rating model"
)]
#[ortho_config(prefix = "CHARGEWISE")]
pub(crate) struct TrainArgs {
    /// Directory holding stations.json, users.json and bookings.json.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Where to write the artefact; defaults to `model.bin` in the data directory.
    #[arg(long = ARG_ARTIFACT, value_name = "path")]
    #[serde(default)]
    pub(crate) artifact: Option<Utf8PathBuf>,
    /// Regressor to fit: `random_forest` or `linear`.
    #[arg(long, value_name = "kind")]
    #[serde(default)]
    pub(crate) algorithm: Option<RegressorKind>,
    /// Share of bookings held out for evaluation.
    #[arg(long, value_name = "fraction")]
    #[serde(default)]
    pub(crate) test_fraction: Option<f64>,
    /// Seed for the split and the forest bootstrap.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Number of trees in the forest.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) trees: Option<usize>,
    /// Maximum depth of each tree.
    #[arg(long, value_name = "depth")]
    #[serde(default)]
    pub(crate) max_depth: Option<usize>,
}

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fit every regressor kind on the same split and print each \
                 evaluation with the winner by lowest held-out MAE. With \
                 --artifact the winning model is saved.",
    about = "Compare rating models"
)]
#[ortho_config(prefix = "CHARGEWISE")]
pub(crate) struct CompareArgs {
    /// Directory holding stations.json, users.json and bookings.json.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Save the winning model here.
    #[arg(long = ARG_ARTIFACT, value_name = "path")]
    #[serde(default)]
    pub(crate) artifact: Option<Utf8PathBuf>,
    /// Share of bookings held out for evaluation.
    #[arg(long, value_name = "fraction")]
    #[serde(default)]
    pub(crate) test_fraction: Option<f64>,
    /// Seed for the split and the forest bootstrap.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Number of trees in the forest.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) trees: Option<usize>,
    /// Maximum depth of each tree.
    #[arg(long, value_name = "depth")]
    #[serde(default)]
    pub(crate) max_depth: Option<usize>,
}

/// Split and forest overrides on top of a base [`TrainingConfig`].
#[derive(Debug, Clone, Copy, Default)]
struct Tuning {
    kind: Option<RegressorKind>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    trees: Option<usize>,
    max_depth: Option<usize>,
}

impl Tuning {
    fn training_config(self, defaults: TrainingConfig) -> TrainingConfig {
        let forest = ForestParams {
            trees: self.trees.unwrap_or(defaults.forest.trees),
            max_depth: self.max_depth.unwrap_or(defaults.forest.max_depth),
            ..defaults.forest
        };
        TrainingConfig {
            kind: self.kind.unwrap_or(defaults.kind),
            forest,
            test_fraction: self.test_fraction.unwrap_or(defaults.test_fraction),
            seed: self.seed.unwrap_or(defaults.seed),
        }
    }
}

impl TrainArgs {
    fn into_config(self) -> Result<TrainConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrainConfig::try_from(merged)
    }
}

impl CompareArgs {
    fn into_config(self) -> Result<CompareConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompareConfig::try_from(merged)
    }
}

/// Resolved `train` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrainConfig {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) artifact: Utf8PathBuf,
    pub(crate) training: TrainingConfig,
}

impl TryFrom<TrainArgs> for TrainConfig {
    type Error = CliError;

    fn try_from(args: TrainArgs) -> Result<Self, Self::Error> {
        let data_dir = args.data_dir.ok_or(CliError::MissingArgument {
            field: ARG_DATA_DIR,
            env: ENV_TRAIN_DATA_DIR,
        })?;
        let artifact = args
            .artifact
            .unwrap_or_else(|| data_dir.join(DEFAULT_ARTIFACT));
        Ok(Self {
            training: Tuning {
                kind: args.algorithm,
                test_fraction: args.test_fraction,
                seed: args.seed,
                trees: args.trees,
                max_depth: args.max_depth,
            }
            .training_config(TrainingConfig::default()),
            data_dir,
            artifact,
        })
    }
}

/// Resolved `compare` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompareConfig {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) artifact: Option<Utf8PathBuf>,
    pub(crate) training: TrainingConfig,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let data_dir = args.data_dir.ok_or(CliError::MissingArgument {
            field: ARG_DATA_DIR,
            env: ENV_COMPARE_DATA_DIR,
        })?;
        Ok(Self {
            data_dir,
            artifact: args.artifact,
            training: Tuning {
                kind: None,
                test_fraction: args.test_fraction,
                seed: args.seed,
                trees: args.trees,
                max_depth: args.max_depth,
            }
            .training_config(TrainingConfig::comparison()),
        })
    }
}

/// What `compare` prints.
#[derive(Debug, Serialize)]
pub(crate) struct ComparisonReport<'a> {
    pub(crate) best: RegressorKind,
    pub(crate) models: Vec<&'a Performance>,
}

pub(crate) fn run_train(args: TrainArgs, output: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_train(&config, Utc::now().naive_utc(), output)
}

pub(crate) fn run_compare(args: CompareArgs, output: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_compare(&config, Utc::now().naive_utc(), output)
}

fn training_set(data_dir: &Utf8Path) -> Result<TrainingSet, CliError> {
    require_existing(&data_dir.join(STATIONS_FILE), ARG_DATA_DIR)?;
    let dataset = load_dataset(data_dir)?;
    Ok(TrainingSet::from_dataset(&dataset)?)
}

pub(crate) fn execute_train(
    config: &TrainConfig,
    trained_at: NaiveDateTime,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    let set = training_set(&config.data_dir)?;
    let model = train(&set, &config.training, trained_at)?;
    model.artifact.save(&config.artifact)?;
    info!(
        "{} model saved to {} (test MAE {:.3})",
        model.performance.kind, config.artifact, model.performance.test_mae
    );
    emit(output, &model.performance)
}

pub(crate) fn execute_compare(
    config: &CompareConfig,
    trained_at: NaiveDateTime,
    output: &mut dyn Write,
) -> Result<(), CliError> {
    let set = training_set(&config.data_dir)?;
    let comparison = compare(&set, &config.training, trained_at)?;
    if let (Some(path), Some(best)) = (&config.artifact, comparison.best_model()) {
        best.artifact.save(path)?;
        info!("{} model saved to {path}", comparison.best);
    }
    emit(
        output,
        &ComparisonReport {
            best: comparison.best,
            models: comparison.performances(),
        },
    )
}
