//! Focused unit tests covering argument resolution and configuration layering.

use super::helpers::{Workspace, write_utf8};
use crate::recommend::{RecommendArgs, RecommendConfig, load_engine};
use crate::simulate::{SimulateArgs, SimulateConfig};
use crate::train::{CompareArgs, CompareConfig, DEFAULT_ARTIFACT, TrainArgs, TrainConfig};
use crate::{
    ARG_DATA_DIR, ARG_DEFAULT_BATTERY, ARG_SNAPSHOT, ARG_TOP_K, Cli, CliError, Command,
    ENV_COMPARE_DATA_DIR, ENV_SNAPSHOT, ENV_TRAIN_DATA_DIR,
};
use camino::Utf8PathBuf;
use chargewise_scorer::{COMPARISON_TREES, RegressorKind, TrainingConfig};
use clap::Parser;
use ortho_config::{MergeComposer, OrthoConfig};
use rstest::rstest;
use serde_json::json;

#[rstest]
fn simulate_requires_a_snapshot() {
    let err = SimulateConfig::try_from(SimulateArgs::default()).expect_err("snapshot is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SNAPSHOT);
            assert_eq!(env, ENV_SNAPSHOT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn simulate_applies_overrides_on_top_of_defaults() {
    let args = SimulateArgs {
        snapshot: Some(Utf8PathBuf::from("snapshot.json")),
        users: Some(12),
        seed: Some(7),
        ..SimulateArgs::default()
    };
    let config = SimulateConfig::try_from(args).expect("config should build");
    assert_eq!(config.output_dir, Utf8PathBuf::from("data"));
    assert_eq!(config.simulation.users, 12);
    assert_eq!(config.simulation.bookings_per_user, 4);
    assert_eq!(config.simulation.seed, 7);
}

#[rstest]
#[case::train(true, ENV_TRAIN_DATA_DIR)]
#[case::compare(false, ENV_COMPARE_DATA_DIR)]
fn training_commands_require_a_data_dir(#[case] train: bool, #[case] env_var: &'static str) {
    let err = if train {
        TrainConfig::try_from(TrainArgs::default()).map(|_| ())
    } else {
        CompareConfig::try_from(CompareArgs::default()).map(|_| ())
    }
    .expect_err("data dir is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DATA_DIR);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn train_defaults_the_artifact_into_the_data_dir() {
    let args = TrainArgs {
        data_dir: Some(Utf8PathBuf::from("runs/today")),
        algorithm: Some(RegressorKind::Linear),
        trees: Some(25),
        ..TrainArgs::default()
    };
    let config = TrainConfig::try_from(args).expect("config should build");
    assert_eq!(config.artifact, Utf8PathBuf::from("runs/today").join(DEFAULT_ARTIFACT));
    assert_eq!(config.training.kind, RegressorKind::Linear);
    assert_eq!(config.training.forest.trees, 25);
    assert_eq!(
        config.training.forest.max_depth,
        TrainingConfig::default().forest.max_depth
    );
}

#[rstest]
fn compare_defaults_to_the_comparison_forest() {
    let args = CompareArgs {
        data_dir: Some(Utf8PathBuf::from("runs/today")),
        ..CompareArgs::default()
    };
    let config = CompareConfig::try_from(args).expect("config should build");
    assert_eq!(config.training.forest.trees, COMPARISON_TREES);
    assert_eq!(
        config.training.forest.max_depth,
        TrainingConfig::default().forest.max_depth
    );

    let overridden = CompareConfig::try_from(CompareArgs {
        data_dir: Some(Utf8PathBuf::from("runs/today")),
        trees: Some(7),
        ..CompareArgs::default()
    })
    .expect("config should build");
    assert_eq!(overridden.training.forest.trees, 7);
}

#[rstest]
fn algorithm_flag_accepts_aliases() {
    let cli = Cli::try_parse_from(["chargewise", "train", "--data-dir", "d", "--algorithm", "forest"])
        .expect("arguments parse");
    let Command::Train(args) = cli.command else {
        panic!("expected the train command");
    };
    assert_eq!(args.algorithm, Some(RegressorKind::RandomForest));
}

#[rstest]
fn unknown_algorithm_is_rejected_by_clap() {
    let err = Cli::try_parse_from(["chargewise", "train", "--algorithm", "svm"])
        .expect_err("unknown algorithm");
    assert!(err.to_string().contains("svm"));
}

#[rstest]
#[case::zero_top_k(Some(0), None, ARG_TOP_K)]
#[case::negative_battery(None, Some(-5.0), ARG_DEFAULT_BATTERY)]
#[case::nan_battery(None, Some(f64::NAN), ARG_DEFAULT_BATTERY)]
fn recommend_rejects_unusable_serving_options(
    #[case] top_k: Option<usize>,
    #[case] battery: Option<f64>,
    #[case] expected: &'static str,
) {
    let args = RecommendArgs {
        top_k,
        default_battery_kwh: battery,
        ..RecommendArgs::default()
    };
    match RecommendConfig::try_from(args) {
        Err(CliError::InvalidArgument { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn train_layers_honour_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "data_dir": "from-file", "seed": 1, "trees": 10 }),
        None,
    );
    composer.push_environment(json!({ "data_dir": "from-env", "seed": 2 }));
    composer.push_cli(json!({ "seed": 3 }));

    let merged = TrainArgs::merge_from_layers(composer.layers()).expect("layers merge");
    let config = TrainConfig::try_from(merged).expect("config should build");
    assert_eq!(config.data_dir, Utf8PathBuf::from("from-env"));
    assert_eq!(config.training.seed, 3);
    assert_eq!(config.training.forest.trees, 10);
}

#[rstest]
fn invalid_layer_maps_to_configuration_error() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "data_dir": 42 }));
    let err = TrainArgs::merge_from_layers(composer.layers())
        .map_err(CliError::from)
        .expect_err("invalid layer should fail");
    assert!(matches!(err, CliError::Configuration(_)));
}

#[rstest]
fn missing_artifact_falls_back_to_rules() {
    let workspace = Workspace::new();
    let path = workspace.path("absent/model.bin");
    let engine = load_engine(Some(path.as_path())).expect("missing file is recoverable");
    assert!(!engine.is_trained());
}

#[rstest]
fn corrupt_artifact_falls_back_to_rules() {
    let workspace = Workspace::new();
    let path = workspace.path("model.bin");
    write_utf8(&path, b"not a model");
    let engine = load_engine(Some(path.as_path())).expect("undecodable file is recoverable");
    assert!(!engine.is_trained());
}

#[rstest]
fn no_artifact_means_rules() {
    let engine = load_engine(None).expect("rules need no artefact");
    assert!(!engine.is_trained());
}
