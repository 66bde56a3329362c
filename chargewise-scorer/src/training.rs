//! Fit and evaluate regressors on a joined training set.
//!
//! Rows are featurised with the training schema, split with a seeded
//! shuffle, standardised with statistics fitted on the training part only
//! and handed to the requested regressor. The held-out part produces the
//! [`Performance`] report.

use std::cmp::Ordering;

use chargewise_data::{TrainingSet, seeded_rng};
use chrono::NaiveDateTime;
use log::info;
use ndarray::{Array2, aview1};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::metrics::{mae, r2, range, rmse};
use crate::{
    CategoryEncoder, FeatureSchema, FittedRegressor, ForestParams, ModelArtifact, RegressorKind,
    StandardScaler, TrainingError, design_matrix,
};

/// Number of feature importances reported.
pub const REPORTED_IMPORTANCES: usize = 8;

/// Forest size used by [`TrainingConfig::comparison`].
pub const COMPARISON_TREES: usize = 100;

/// Rating span used to express MAE as an accuracy percentage.
const RATING_SPAN: f64 = 4.0;

/// How a model is trained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Regressor to fit.
    pub kind: RegressorKind,
    /// Forest hyper-parameters, ignored for linear models.
    pub forest: ForestParams,
    /// Share of rows held out for evaluation, within `(0, 1)`.
    pub test_fraction: f64,
    /// Seed for the split and the forest bootstrap.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            kind: RegressorKind::default(),
            forest: ForestParams::default(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Defaults with the smaller forest used when comparing regressors.
    #[must_use]
    pub fn comparison() -> Self {
        Self {
            forest: ForestParams {
                trees: COMPARISON_TREES,
                ..ForestParams::default()
            },
            ..Self::default()
        }
    }
}

/// One feature's share of the forest's impurity decrease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Column name.
    pub feature: String,
    /// Normalised importance.
    pub importance: f64,
}

/// Evaluation of one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Regressor kind.
    pub kind: RegressorKind,
    /// Rows used for fitting.
    pub train_rows: usize,
    /// Rows held out.
    pub test_rows: usize,
    /// RMSE on the training rows.
    pub train_rmse: f64,
    /// RMSE on the held-out rows.
    pub test_rmse: f64,
    /// MAE on the held-out rows.
    pub test_mae: f64,
    /// R² on the held-out rows.
    pub test_r2: f64,
    /// `(1 - MAE / 4) * 100`.
    pub accuracy_pct: f64,
    /// Lowest and highest held-out rating.
    pub actual_range: Option<(f64, f64)>,
    /// Lowest and highest held-out prediction.
    pub predicted_range: Option<(f64, f64)>,
    /// Most important features, forest only.
    pub feature_importances: Vec<FeatureImportance>,
}

/// A validated artefact with its evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    /// The artefact ready to save or install.
    pub artifact: ModelArtifact,
    /// Held-out evaluation.
    pub performance: Performance,
}

/// Both regressors evaluated on the same split.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// One trained model per kind, in [`RegressorKind::ALL`] order.
    pub models: Vec<TrainedModel>,
    /// Kind with the lowest held-out MAE.
    pub best: RegressorKind,
}

impl Comparison {
    /// The winning model.
    #[must_use]
    pub fn best_model(&self) -> Option<&TrainedModel> {
        self.models
            .iter()
            .find(|model| model.artifact.kind() == self.best)
    }

    /// Evaluations in training order.
    #[must_use]
    pub fn performances(&self) -> Vec<&Performance> {
        self.models.iter().map(|model| &model.performance).collect()
    }
}

/// Featurised, split and standardised rows.
struct Prepared {
    schema: FeatureSchema,
    encoder: CategoryEncoder,
    scaler: StandardScaler,
    train_x: Array2<f64>,
    train_y: Vec<f64>,
    test_x: Array2<f64>,
    test_y: Vec<f64>,
}

impl Prepared {
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "held-out count is a rounded-up share of a bounded row count"
    )]
    fn new(set: &TrainingSet, config: &TrainingConfig) -> Result<Self, TrainingError> {
        let rows = set.len();
        if rows < 2 {
            return Err(TrainingError::TooFewRows { rows });
        }
        let fraction = config.test_fraction;
        if fraction.is_nan() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(TrainingError::InvalidTestFraction(fraction));
        }

        let encoder = CategoryEncoder::fit(
            set.examples()
                .iter()
                .filter_map(|example| example.station.charger_category),
        )?;
        let schema = FeatureSchema::training();
        let builder = crate::FeatureBuilder::new(&schema, &encoder);
        let mut labelled = set
            .examples()
            .iter()
            .map(|example| {
                builder
                    .build(&example.station, &example.user, Some(example.booked_at))
                    .map(|features| (features, example.rating))
            })
            .collect::<Result<Vec<_>, _>>()?;

        labelled.shuffle(&mut seeded_rng(config.seed));
        let test_rows = ((rows as f64 * fraction).ceil() as usize).clamp(1, rows - 1);
        let train_part = labelled.split_off(test_rows);
        let (train_features, train_y): (Vec<_>, Vec<_>) = train_part.into_iter().unzip();
        let (test_features, test_y): (Vec<_>, Vec<_>) = labelled.into_iter().unzip();
        let raw_train = design_matrix(&train_features)?;
        let raw_test = design_matrix(&test_features)?;

        let scaler = StandardScaler::fit(raw_train.view())?;
        let train_x = scaler.transform_matrix(raw_train.view())?;
        let test_x = scaler.transform_matrix(raw_test.view())?;
        Ok(Self {
            schema,
            encoder,
            scaler,
            train_x,
            train_y,
            test_x,
            test_y,
        })
    }

    fn fit(
        &self,
        kind: RegressorKind,
        config: &TrainingConfig,
        trained_at: NaiveDateTime,
    ) -> Result<TrainedModel, TrainingError> {
        let regressor = FittedRegressor::fit(
            kind,
            self.train_x.view(),
            aview1(&self.train_y),
            &config.forest,
            config.seed,
        )?;
        let train_pred = predict_all(&regressor, &self.train_x)?;
        let test_pred = predict_all(&regressor, &self.test_x)?;
        let performance = self.evaluate(kind, &regressor, &train_pred, &test_pred);
        info!(
            "trained {kind} on {} rows: test RMSE {:.3}, MAE {:.3}, R² {:.3}, accuracy {:.1}%",
            performance.train_rows,
            performance.test_rmse,
            performance.test_mae,
            performance.test_r2,
            performance.accuracy_pct
        );
        let artifact = ModelArtifact::new(
            trained_at,
            self.schema.clone(),
            self.encoder.clone(),
            self.scaler.clone(),
            regressor,
        )?;
        Ok(TrainedModel {
            artifact,
            performance,
        })
    }

    #[expect(clippy::float_arithmetic, reason = "accuracy percentage")]
    fn evaluate(
        &self,
        kind: RegressorKind,
        regressor: &FittedRegressor,
        train_pred: &[f64],
        test_pred: &[f64],
    ) -> Performance {
        let test_mae = mae(&self.test_y, test_pred);
        Performance {
            kind,
            train_rows: self.train_y.len(),
            test_rows: self.test_y.len(),
            train_rmse: rmse(&self.train_y, train_pred),
            test_rmse: rmse(&self.test_y, test_pred),
            test_mae,
            test_r2: r2(&self.test_y, test_pred),
            accuracy_pct: (1.0 - test_mae / RATING_SPAN) * 100.0,
            actual_range: range(&self.test_y),
            predicted_range: range(test_pred),
            feature_importances: regressor
                .feature_importances()
                .map(|values| top_importances(&self.schema, values))
                .unwrap_or_default(),
        }
    }
}

fn predict_all(regressor: &FittedRegressor, rows: &Array2<f64>) -> Result<Vec<f64>, TrainingError> {
    rows.rows()
        .into_iter()
        .map(|row| regressor.predict(&row.to_vec()).map_err(TrainingError::from))
        .collect()
}

fn top_importances(schema: &FeatureSchema, values: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = schema
        .names()
        .into_iter()
        .zip(values)
        .map(|(feature, importance)| FeatureImportance {
            feature,
            importance: *importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(REPORTED_IMPORTANCES);
    ranked
}

/// Train the configured regressor.
///
/// # Errors
/// [`TrainingError`] when the set is too small, the configuration is
/// invalid, a row cannot be featurised or the bundle fails validation.
pub fn train(
    set: &TrainingSet,
    config: &TrainingConfig,
    trained_at: NaiveDateTime,
) -> Result<TrainedModel, TrainingError> {
    Prepared::new(set, config)?.fit(config.kind, config, trained_at)
}

/// Train every regressor kind on one split and pick the lowest MAE.
///
/// `config.kind` is ignored. [`TrainingConfig::comparison`] gives the
/// usual forest size for a comparison run.
///
/// # Errors
/// See [`train`].
pub fn compare(
    set: &TrainingSet,
    config: &TrainingConfig,
    trained_at: NaiveDateTime,
) -> Result<Comparison, TrainingError> {
    let prepared = Prepared::new(set, config)?;
    let models = RegressorKind::ALL
        .into_iter()
        .map(|kind| prepared.fit(kind, config, trained_at))
        .collect::<Result<Vec<_>, _>>()?;
    let best = models
        .iter()
        .min_by(|a, b| {
            a.performance
                .test_mae
                .partial_cmp(&b.performance.test_mae)
                .unwrap_or(Ordering::Equal)
        })
        .map_or(config.kind, |model| model.artifact.kind());
    info!("best model by test MAE: {best}");
    Ok(Comparison { models, best })
}
