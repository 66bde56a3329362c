//! Behavioural coverage for ranking with and without a trained model.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chargewise_core::{ChargerCategory, StationFeatures, UserPreferences};
use chargewise_scorer::{
    ArtifactError, Candidate, RecommenderService, RegressorKind, Score, ScoringEngine,
    ServiceError,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

mod support;

/// Mutable state shared by the steps of one scenario.
pub struct World {
    service: RecommenderService,
    candidates: RefCell<Vec<Candidate<&'static str>>>,
    user: RefCell<Option<UserPreferences>>,
    results: RefCell<Option<Vec<(&'static str, Score)>>>,
    load_error: RefCell<Option<ServiceError>>,
}

/// Fresh scenario state backed by the shared simulated dataset.
#[fixture]
pub fn world() -> World {
    World {
        service: RecommenderService::new(
            support::simulated_dataset(),
            support::quick_training(),
            ScoringEngine::default(),
        ),
        candidates: RefCell::new(Vec::new()),
        user: RefCell::new(None),
        results: RefCell::new(None),
        load_error: RefCell::new(None),
    }
}

fn station(
    distance_km: f64,
    category: ChargerCategory,
    max_power_kw: f64,
    price: f64,
    slots: u32,
    total: u32,
) -> StationFeatures {
    StationFeatures {
        distance_km,
        available_slots: Some(slots),
        total_connections: Some(total),
        max_power_kw: Some(max_power_kw),
        price_per_kwh: Some(price),
        reliability_score: None,
        charger_category: Some(category),
        is_operational: true,
    }
}

#[given("no trained model")]
fn no_model(world: &World) {
    world.service.engine().clear();
}

#[given("a model trained on simulated bookings")]
fn trained_model(world: &World) {
    world
        .service
        .train_at(RegressorKind::RandomForest, support::reference_time())
        .unwrap_or_else(|err| panic!("training succeeds: {err}"));
}

#[given("three candidate stations at 1 km, 10 km and 40 km")]
fn three_candidates(world: &World) {
    *world.candidates.borrow_mut() = vec![
        Candidate::new(
            "busy",
            station(10.0, ChargerCategory::Fast, 22.0, 9.0, 0, 3),
        ),
        Candidate::new(
            "far",
            station(40.0, ChargerCategory::Slow, 7.0, 7.0, 3, 4),
        ),
        Candidate::new(
            "near",
            station(1.0, ChargerCategory::Superfast, 50.0, 12.0, 2, 2),
        ),
    ];
}

#[given("no candidate stations")]
fn no_candidates(world: &World) {
    world.candidates.borrow_mut().clear();
}

#[given("a user with a 72 kWh battery who is not price sensitive")]
fn large_battery_user(world: &World) {
    *world.user.borrow_mut() = Some(UserPreferences::new(72.0, false));
}

#[when("I request recommendations")]
fn request(world: &World) {
    let user = world
        .user
        .borrow()
        .unwrap_or_else(|| panic!("user must be set"));
    let candidates = world.candidates.take();
    let ranked = world.service.engine().recommend(candidates, &user);
    *world.results.borrow_mut() = Some(ranked.into_iter().map(|r| (r.payload, r.score)).collect());
}

#[when("I load a model from a missing file")]
fn load_missing(world: &World) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("temporary directory: {err}"));
    let path = Utf8PathBuf::from_path_buf(dir.path().join("absent/model.bin"))
        .unwrap_or_else(|path| panic!("utf8 path: {}", path.display()));
    let err = world
        .service
        .reload(&path)
        .err()
        .unwrap_or_else(|| panic!("loading a missing file must fail"));
    *world.load_error.borrow_mut() = Some(err);
}

fn results(world: &World) -> Vec<(&'static str, Score)> {
    world
        .results
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("recommendations must be requested"))
}

#[then("the stations are ranked near, far, busy")]
fn ranked_order(world: &World) {
    let order: Vec<&str> = results(world).iter().map(|(name, _)| *name).collect();
    assert_eq!(order, vec!["near", "far", "busy"]);
}

#[then("each result carries a rule score")]
fn rule_scores(world: &World) {
    let scores: Vec<Score> = results(world).iter().map(|(_, score)| *score).collect();
    assert_eq!(
        scores,
        vec![
            Score::RuleScore(101.54),
            Score::RuleScore(90.33),
            Score::RuleScore(31.33)
        ]
    );
}

#[then("no recommendations are returned")]
fn nothing_returned(world: &World) {
    assert!(results(world).is_empty());
}

#[then("every candidate is rated between 1 and 5")]
fn ratings_in_range(world: &World) {
    let scored = results(world);
    assert_eq!(scored.len(), 3);
    for (name, score) in scored {
        let Score::PredictedRating(rating) = score else {
            panic!("{name} must carry a predicted rating");
        };
        assert!((1.0..=5.0).contains(&rating), "{name} rated {rating}");
    }
}

#[then("the load error allows falling back to rules")]
fn recoverable(world: &World) {
    let binding = world.load_error.borrow();
    let Some(ServiceError::Artifact(err)) = binding.as_ref() else {
        panic!("expected an artefact error");
    };
    assert!(matches!(err, ArtifactError::Read { .. }));
    assert!(err.is_recoverable());
}

#[then("the service reports no trained model")]
fn untrained(world: &World) {
    assert!(!world.service.status().is_trained);
}

#[scenario(path = "tests/features/recommendation.feature", index = 0)]
fn rule_ranking(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/recommendation.feature", index = 1)]
fn empty_candidates(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/recommendation.feature", index = 2)]
fn model_ratings_in_range(world: World) {
    let _ = world;
}

#[scenario(path = "tests/features/recommendation.feature", index = 3)]
fn missing_model_falls_back(world: World) {
    let _ = world;
}
