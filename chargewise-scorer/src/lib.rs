//! Feature engineering, model training and station ranking for Chargewise.
//!
//! The crate provides three complementary capabilities:
//! - **Feature derivation** through one [`FeatureBuilder`] bound to a
//!   [`FeatureSchema`]. Training and inference both go through it, so the
//!   columns a model sees at serving time are exactly those it was fitted
//!   on.
//! - **Offline training** of a linear model or a random forest from a
//!   joined [`TrainingSet`](chargewise_data::TrainingSet), producing a
//!   versioned [`ModelArtifact`] persisted with `bincode`.
//! - **Request-time ranking** via [`ScoringEngine`], which uses the
//!   installed artefact when present and the [`RuleBasedScorer`] otherwise.
//!   [`recommend_json`] wraps the engine in the JSON contract used across
//!   process boundaries.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use chargewise_scorer::{ModelArtifact, ScoringEngine, ServingConfig, recommend_json};
//!
//! let engine = ScoringEngine::default();
//! if let Ok(artifact) = ModelArtifact::load(Utf8Path::new("artifacts/model.bin")) {
//!     engine.install(artifact);
//! }
//! let body = r#"{"stations": [], "user_preferences": {}}"#;
//! let response = recommend_json(&engine, body, &ServingConfig::default())
//!     .expect("valid request");
//! assert_eq!(response, "[]");
//! ```

#![forbid(unsafe_code)]

mod artifact;
mod encoder;
mod engine;
mod error;
mod features;
mod metrics;
mod regressor;
mod rules;
mod scaler;
mod service;
mod serving;
mod training;

pub use artifact::{
    ARTIFACT_FORMAT_VERSION, MAX_PREDICTED_RATING, MIN_PREDICTED_RATING, ModelArtifact,
};
pub use encoder::CategoryEncoder;
pub use engine::{Candidate, DEFAULT_TOP_K, Ranked, Score, ScoringEngine};
pub use error::{
    ArtifactError, EncoderError, FeatureError, ServiceError, ServingError, TrainingError,
};
pub use features::{
    DEFAULT_HOUR, DEFAULT_RELIABILITY, DistanceBuckets, FeatureBuilder, FeatureName, FeatureSchema,
    FeatureSlot,
};
pub use regressor::{
    FittedRegressor, ForestParams, LinearModel, RandomForest, RegressorKind, design_matrix,
};
pub use rules::{RuleBasedScorer, RuleWeights};
pub use scaler::StandardScaler;
pub use service::{RecommenderService, ServiceStatus, TrainOutcome};
pub use serving::{RecommendRequest, ServingConfig, recommend_json};
pub use training::{
    COMPARISON_TREES, Comparison, FeatureImportance, Performance, REPORTED_IMPORTANCES, TrainedModel,
    TrainingConfig, compare, train,
};
