//! Facade crate for the Chargewise charging-station recommender.
//!
//! This crate re-exports the domain types, the data pipeline and the
//! scoring engine so applications can depend on a single crate.

#![forbid(unsafe_code)]

pub use chargewise_core::{
    Booking, ChargerCategory, ChargingFrequency, PreferredSpeed, Station, StationConditions,
    StationError, StationFeatures, StationScorer, User, UserPreferences, haversine_km,
};

pub use chargewise_data::{
    CityBatch, DatasetSummary, NormaliseReport, SimulatedDataset, SimulationConfig,
    SimulationError, TrainingSet, normalise_cities, simulate_dataset,
};

pub use chargewise_scorer::{
    ArtifactError, Candidate, FeatureBuilder, FeatureSchema, ModelArtifact, Ranked,
    RecommendRequest, RecommenderService, RegressorKind, RuleBasedScorer, Score, ScoringEngine, ServingConfig,
    TrainingConfig, compare, recommend_json, train,
};
