//! Artefact persistence and the service facade end to end.

use camino::Utf8PathBuf;
use chargewise_core::{ChargerCategory, StationFeatures, UserPreferences};
use chargewise_data::TrainingSet;
use chargewise_scorer::{
    ArtifactError, ModelArtifact, RecommenderService, RegressorKind, ScoringEngine, ServiceError,
    ServingConfig, compare, recommend_json, train,
};
use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

mod support;

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("temporary directory: {err}"))
}

fn model_path(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("models/recommender.bin"))
        .unwrap_or_else(|path| panic!("utf8 path: {}", path.display()))
}

fn service() -> RecommenderService {
    RecommenderService::new(
        support::simulated_dataset(),
        support::quick_training(),
        ScoringEngine::default(),
    )
}

fn superfast_nearby() -> StationFeatures {
    StationFeatures {
        distance_km: 2.5,
        available_slots: Some(2),
        total_connections: Some(3),
        max_power_kw: Some(60.0),
        price_per_kwh: Some(12.0),
        reliability_score: Some(0.9),
        charger_category: Some(ChargerCategory::Superfast),
        is_operational: true,
    }
}

#[rstest]
fn saved_artifact_loads_identically(temp_dir: TempDir) {
    let set = TrainingSet::from_dataset(&support::simulated_dataset())
        .unwrap_or_else(|err| panic!("rows join: {err}"));
    let model = train(&set, &support::quick_training(), support::reference_time())
        .unwrap_or_else(|err| panic!("training succeeds: {err}"));
    let path = model_path(&temp_dir);
    model
        .artifact
        .save(&path)
        .unwrap_or_else(|err| panic!("save succeeds: {err}"));
    let loaded = ModelArtifact::load(&path).unwrap_or_else(|err| panic!("load succeeds: {err}"));
    assert_eq!(loaded, model.artifact);
}

#[rstest]
fn corrupt_artifact_is_recoverable(temp_dir: TempDir) {
    let path = model_path(&temp_dir);
    chargewise_fs::write_atomic(&path, b"\x01\x02 definitely not a model")
        .unwrap_or_else(|err| panic!("write succeeds: {err}"));
    let err = ModelArtifact::load(&path)
        .err()
        .unwrap_or_else(|| panic!("corrupt file must not load"));
    assert!(matches!(err, ArtifactError::Decode(_)));
    assert!(err.is_recoverable());
}

#[rstest]
fn predict_requires_a_model() {
    let err = service()
        .predict(&UserPreferences::new(45.0, false), &superfast_nearby())
        .err()
        .unwrap_or_else(|| panic!("prediction without a model must fail"));
    assert!(matches!(err, ServiceError::NotTrained));
}

#[rstest]
fn training_persists_and_reloads(temp_dir: TempDir) {
    let path = model_path(&temp_dir);
    let trainer = service().with_artifact_path(path.clone());
    let outcome = trainer
        .train_at(RegressorKind::Linear, support::reference_time())
        .unwrap_or_else(|err| panic!("training succeeds: {err}"));
    assert!(outcome.message.contains("linear"));
    assert!(outcome.performance.feature_importances.is_empty());

    let status = trainer.status();
    assert!(status.is_trained);
    assert_eq!(status.kind, Some(RegressorKind::Linear));
    assert_eq!(status.trained_at, Some(support::reference_time()));

    let server = service();
    server
        .reload(&path)
        .unwrap_or_else(|err| panic!("reload succeeds: {err}"));
    let user = UserPreferences::new(60.0, true);
    let from_trainer = trainer
        .predict(&user, &superfast_nearby())
        .unwrap_or_else(|err| panic!("trainer predicts: {err}"));
    let from_server = server
        .predict(&user, &superfast_nearby())
        .unwrap_or_else(|err| panic!("server predicts: {err}"));
    assert_eq!(from_trainer, from_server);
    assert!((1.0..=5.0).contains(&from_server));
}

#[rstest]
fn unseen_category_is_dropped_not_fatal() {
    let trainer = service();
    trainer
        .train_at(RegressorKind::RandomForest, support::reference_time())
        .unwrap_or_else(|err| panic!("training succeeds: {err}"));
    let request = r#"{
        "stations": [
            {"id": "ok", "distance": 2, "total_connections": 2, "max_power_kw": 60,
             "usage_cost": 12, "charger_category": "superfast"},
            {"id": "odd", "distance": 2, "total_connections": 2, "max_power_kw": 60,
             "usage_cost": 12, "charger_category": "hyperfast"}
        ],
        "user_preferences": {"battery_capacity_kwh": 60}
    }"#;
    let body = recommend_json(trainer.engine(), request, &ServingConfig::default())
        .unwrap_or_else(|err| panic!("served: {err}"));
    let stations: Vec<Value> =
        serde_json::from_str(&body).unwrap_or_else(|err| panic!("JSON array: {err}"));
    assert_eq!(stations.len(), 1);
    let only = stations.first().unwrap_or_else(|| panic!("one station"));
    assert_eq!(only.get("id").and_then(Value::as_str), Some("ok"));
    let rating = only
        .get("predicted_rating")
        .and_then(Value::as_f64)
        .unwrap_or_else(|| panic!("predicted rating present"));
    assert!((1.0..=5.0).contains(&rating));
}

#[rstest]
fn comparison_reports_both_models() {
    let set = TrainingSet::from_dataset(&support::simulated_dataset())
        .unwrap_or_else(|err| panic!("rows join: {err}"));
    let comparison = compare(&set, &support::quick_training(), support::reference_time())
        .unwrap_or_else(|err| panic!("comparison succeeds: {err}"));
    let kinds: Vec<RegressorKind> = comparison
        .performances()
        .iter()
        .map(|perf| perf.kind)
        .collect();
    assert_eq!(kinds, vec![RegressorKind::RandomForest, RegressorKind::Linear]);
    assert!(comparison.best_model().is_some());
}
