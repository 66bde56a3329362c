//! Per-column standardisation fitted on training rows only.

use ndarray::{Array2, ArrayView2, Axis, aview1};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, TrainingError};

/// Column means and scales; `transform` maps `x` to `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit population statistics over the columns of `rows`.
    ///
    /// Constant columns get a scale of one so they transform to zero.
    ///
    /// # Errors
    /// [`TrainingError::TooFewRows`] for a matrix without rows.
    pub fn fit(rows: ArrayView2<'_, f64>) -> Result<Self, TrainingError> {
        let Some(mean) = rows.mean_axis(Axis(0)) else {
            return Err(TrainingError::TooFewRows { rows: 0 });
        };
        let scale = rows
            .std_axis(Axis(0), 0.0)
            .mapv(|deviation| if deviation > 0.0 { deviation } else { 1.0 });
        Ok(Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    /// Number of columns fitted.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.mean.len()
    }

    /// Fitted column means.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted column scales.
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardise one row.
    ///
    /// # Errors
    /// [`FeatureError::Width`] when `row` does not match the fitted width.
    #[expect(clippy::float_arithmetic, reason = "standardisation")]
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, FeatureError> {
        if row.len() != self.width() {
            return Err(FeatureError::Width {
                expected: self.width(),
                found: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((value, mean), scale)| (value - mean) / scale)
            .collect())
    }

    /// Standardise every row of a matrix.
    ///
    /// # Errors
    /// [`FeatureError::Width`] when the column count does not match.
    pub fn transform_matrix(
        &self,
        rows: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, FeatureError> {
        if rows.ncols() != self.width() {
            return Err(FeatureError::Width {
                expected: self.width(),
                found: rows.ncols(),
            });
        }
        Ok((&rows - &aview1(&self.mean)) / &aview1(&self.scale))
    }
}
