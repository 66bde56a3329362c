//! Train, predict and status operations over one shared engine.

use camino::{Utf8Path, Utf8PathBuf};
use chargewise_core::{StationFeatures, StationScorer, UserPreferences};
use chargewise_data::{SimulatedDataset, TrainingSet};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ModelArtifact, Performance, RegressorKind, ScoringEngine, ServiceError, TrainingConfig, train,
};

/// Result of a successful training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOutcome {
    /// Human-readable summary.
    pub message: String,
    /// Held-out evaluation.
    pub performance: Performance,
}

/// Whether a model is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// A model is installed.
    pub is_trained: bool,
    /// Kind of the installed model.
    pub kind: Option<RegressorKind>,
    /// When the installed model was trained.
    pub trained_at: Option<NaiveDateTime>,
}

/// Owns the training data and the engine that serves predictions.
#[derive(Debug)]
pub struct RecommenderService {
    dataset: SimulatedDataset,
    config: TrainingConfig,
    engine: ScoringEngine,
    artifact_path: Option<Utf8PathBuf>,
}

impl RecommenderService {
    /// Service over `dataset` with no model installed.
    #[must_use]
    pub fn new(dataset: SimulatedDataset, config: TrainingConfig, engine: ScoringEngine) -> Self {
        Self {
            dataset,
            config,
            engine,
            artifact_path: None,
        }
    }

    /// Persist every newly trained artefact to `path`.
    #[must_use]
    pub fn with_artifact_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.artifact_path = Some(path.into());
        self
    }

    /// Engine used for predictions.
    #[must_use]
    pub const fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Train a `kind` model now and install it.
    ///
    /// # Errors
    /// See [`RecommenderService::train_at`].
    pub fn train(&self, kind: RegressorKind) -> Result<TrainOutcome, ServiceError> {
        self.train_at(kind, Utc::now().naive_utc())
    }

    /// Train a `kind` model stamped with `trained_at`, persist it when a
    /// path is configured, then install it.
    ///
    /// The installed model only changes once the artefact is saved.
    ///
    /// # Errors
    /// [`ServiceError::Join`] when no booking joins, [`ServiceError::Training`]
    /// when fitting fails and [`ServiceError::Artifact`] when saving fails.
    pub fn train_at(
        &self,
        kind: RegressorKind,
        trained_at: NaiveDateTime,
    ) -> Result<TrainOutcome, ServiceError> {
        let set = TrainingSet::from_dataset(&self.dataset)?;
        let config = TrainingConfig { kind, ..self.config };
        let model = train(&set, &config, trained_at)?;
        if let Some(path) = &self.artifact_path {
            model.artifact.save(path)?;
        }
        self.engine.install(model.artifact);
        Ok(TrainOutcome {
            message: format!("{kind} model trained successfully"),
            performance: model.performance,
        })
    }

    /// Predict one station's rating for one user.
    ///
    /// # Errors
    /// [`ServiceError::NotTrained`] without a model and
    /// [`ServiceError::Features`] when the station cannot be featurised.
    pub fn predict(
        &self,
        user: &UserPreferences,
        station: &StationFeatures,
    ) -> Result<f64, ServiceError> {
        let model = self.engine.model().ok_or(ServiceError::NotTrained)?;
        Ok(model.score(station, user)?)
    }

    /// Current model state.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let model = self.engine.model();
        ServiceStatus {
            is_trained: model.is_some(),
            kind: model.as_deref().map(ModelArtifact::kind),
            trained_at: model.as_deref().map(ModelArtifact::trained_at),
        }
    }

    /// Load an artefact from disk and install it.
    ///
    /// The installed model is untouched when loading fails.
    ///
    /// # Errors
    /// [`ServiceError::Artifact`] when the file cannot be used.
    pub fn reload(&self, path: &Utf8Path) -> Result<(), ServiceError> {
        let artifact = ModelArtifact::load(path)?;
        self.engine.install(artifact);
        Ok(())
    }
}
