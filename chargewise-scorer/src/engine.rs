//! Rank candidate stations with the installed model or the rule fallback.
//!
//! The engine holds at most one [`ModelArtifact`] behind a lock. Installing
//! or clearing swaps the whole `Arc`, and every ranking call takes one
//! snapshot up front, so a batch is always scored by a single consistent
//! bundle.

use std::sync::{Arc, PoisonError, RwLock};

use chargewise_core::{StationFeatures, StationScorer, UserPreferences, round_dp};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{ModelArtifact, RuleBasedScorer};

/// Recommendations returned by [`ScoringEngine::recommend`] by default.
pub const DEFAULT_TOP_K: usize = 3;

/// A station to rank with whatever the caller wants back alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    /// Caller data returned untouched.
    pub payload: T,
    /// Scoring inputs.
    pub features: StationFeatures,
}

impl<T> Candidate<T> {
    /// Pair a payload with its scoring inputs.
    #[must_use]
    pub const fn new(payload: T, features: StationFeatures) -> Self {
        Self { payload, features }
    }
}

/// How a ranked station was scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Model rating in `1.0..=5.0`, two decimals.
    PredictedRating(f64),
    /// Unbounded rule score, two decimals.
    RuleScore(f64),
}

impl Score {
    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::PredictedRating(value) | Self::RuleScore(value) => value,
        }
    }

    /// Output field name for this kind of score.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::PredictedRating(_) => "predicted_rating",
            Self::RuleScore(_) => "rule_score",
        }
    }
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    /// Caller data.
    pub payload: T,
    /// Scoring inputs.
    pub features: StationFeatures,
    /// Assigned score.
    pub score: Score,
}

/// Ranks candidates for one user.
#[derive(Debug)]
pub struct ScoringEngine {
    model: RwLock<Option<Arc<ModelArtifact>>>,
    rules: RuleBasedScorer,
    top_k: usize,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(RuleBasedScorer::default(), DEFAULT_TOP_K)
    }
}

impl ScoringEngine {
    /// Engine without a model.
    #[must_use]
    pub const fn new(rules: RuleBasedScorer, top_k: usize) -> Self {
        Self {
            model: RwLock::new(None),
            rules,
            top_k,
        }
    }

    /// Engine that starts with `artifact` installed.
    #[must_use]
    pub fn with_model(artifact: ModelArtifact, rules: RuleBasedScorer, top_k: usize) -> Self {
        let engine = Self::new(rules, top_k);
        engine.install(artifact);
        engine
    }

    /// Replace the installed model in one step.
    pub fn install(&self, artifact: ModelArtifact) {
        let shared = Arc::new(artifact);
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Some(shared);
    }

    /// Remove the installed model so ranking falls back to rules.
    pub fn clear(&self) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Snapshot of the installed model.
    #[must_use]
    pub fn model(&self) -> Option<Arc<ModelArtifact>> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a model is installed.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.model().is_some()
    }

    /// Number of results [`recommend`](Self::recommend) returns.
    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rule scorer used without a model.
    #[must_use]
    pub const fn rules(&self) -> &RuleBasedScorer {
        &self.rules
    }

    /// Score every candidate and sort by descending score.
    ///
    /// With a model, stations that cannot be featurised are logged and
    /// dropped. Ties keep their input order.
    pub fn rank<T>(&self, candidates: Vec<Candidate<T>>, user: &UserPreferences) -> Vec<Ranked<T>> {
        let model = self.model();
        let mut ranked: Vec<Ranked<T>> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(position, candidate)| {
                let score = match model.as_deref() {
                    Some(artifact) => match artifact.score(&candidate.features, user) {
                        Ok(rating) => Score::PredictedRating(rating),
                        Err(err) => {
                            warn!("skipping candidate {position}: {err}");
                            return None;
                        }
                    },
                    None => Score::RuleScore(round_dp(
                        self.rules.rule_score(&candidate.features, user),
                        2,
                    )),
                };
                Some(Ranked {
                    payload: candidate.payload,
                    features: candidate.features,
                    score,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));
        debug!(
            "ranked {} candidates with {}",
            ranked.len(),
            if model.is_some() { "model" } else { "rules" }
        );
        ranked
    }

    /// The best [`top_k`](Self::top_k) candidates.
    pub fn recommend<T>(
        &self,
        candidates: Vec<Candidate<T>>,
        user: &UserPreferences,
    ) -> Vec<Ranked<T>> {
        let mut ranked = self.rank(candidates, user);
        ranked.truncate(self.top_k);
        ranked
    }
}
