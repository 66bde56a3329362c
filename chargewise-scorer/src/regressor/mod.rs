//! Regressors that map a standardised feature vector to a rating.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, TrainingError};

mod forest;
mod linear;

pub use forest::{ForestParams, RandomForest};
pub use linear::LinearModel;

/// Which regressor to train.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorKind {
    /// Bagged regression trees.
    #[default]
    RandomForest,
    /// Ordinary least squares.
    Linear,
}

impl RegressorKind {
    /// Every supported kind, in comparison order.
    pub const ALL: [Self; 2] = [Self::RandomForest, Self::Linear];

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for RegressorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegressorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "forest" => Ok(Self::RandomForest),
            "linear" | "linear_regression" => Ok(Self::Linear),
            _ => Err(format!("unknown model type '{s}'")),
        }
    }
}

/// A fitted regressor of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedRegressor {
    /// Linear model.
    Linear(LinearModel),
    /// Random forest.
    Forest(RandomForest),
}

impl FittedRegressor {
    /// Fit the requested kind.
    ///
    /// # Errors
    /// Propagates fitting failures.
    pub fn fit(
        kind: RegressorKind,
        rows: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        forest: &ForestParams,
        seed: u64,
    ) -> Result<Self, TrainingError> {
        match kind {
            RegressorKind::Linear => LinearModel::fit(rows, targets).map(Self::Linear),
            RegressorKind::RandomForest => {
                RandomForest::fit(rows, targets, forest, seed).map(Self::Forest)
            }
        }
    }

    /// Kind of the fitted model.
    #[must_use]
    pub const fn kind(&self) -> RegressorKind {
        match self {
            Self::Linear(_) => RegressorKind::Linear,
            Self::Forest(_) => RegressorKind::RandomForest,
        }
    }

    /// Expected input width.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Linear(model) => model.width(),
            Self::Forest(model) => model.width(),
        }
    }

    /// Per-column importances; forests only.
    #[must_use]
    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            Self::Linear(_) => None,
            Self::Forest(model) => Some(model.feature_importances()),
        }
    }

    /// Whether the decoded parameters are internally consistent.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Linear(model) => {
                model.intercept().is_finite() && model.coefficients().iter().all(|c| c.is_finite())
            }
            Self::Forest(model) => model.is_well_formed(),
        }
    }

    /// Predict one standardised row.
    ///
    /// # Errors
    /// [`FeatureError::Width`] when `row` does not match the fitted width.
    pub fn predict(&self, row: &[f64]) -> Result<f64, FeatureError> {
        if row.len() != self.width() {
            return Err(FeatureError::Width {
                expected: self.width(),
                found: row.len(),
            });
        }
        Ok(match self {
            Self::Linear(model) => model.predict(row),
            Self::Forest(model) => model.predict(row),
        })
    }
}

/// Stack feature rows into a design matrix.
///
/// # Errors
/// [`TrainingError::TooFewRows`] for no rows and
/// [`TrainingError::RaggedMatrix`] when rows differ in width.
pub fn design_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, TrainingError> {
    let Some(first) = rows.first() else {
        return Err(TrainingError::TooFewRows { rows: 0 });
    };
    let width = first.len();
    if rows.iter().any(|row| row.len() != width) {
        return Err(TrainingError::RaggedMatrix);
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((rows.len(), width), flat)?)
}

/// Check that a design matrix has rows and one target per row.
fn check_design(
    rows: &ArrayView2<'_, f64>,
    targets: &ArrayView1<'_, f64>,
) -> Result<usize, TrainingError> {
    if rows.nrows() == 0 || rows.nrows() != targets.len() {
        return Err(TrainingError::TooFewRows {
            rows: rows.nrows().min(targets.len()),
        });
    }
    Ok(rows.ncols())
}
