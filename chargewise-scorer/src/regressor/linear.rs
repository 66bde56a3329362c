//! Ordinary least squares with an intercept.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate};
use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// Ridge added to the normal equations so constant columns stay solvable.
const RIDGE: f64 = 1e-8;
/// Pivots smaller than this are treated as zero.
const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted linear model `intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fit by solving the normal equations `XᵀX β = Xᵀy`, where `X` is
    /// `rows` with a leading column of ones.
    ///
    /// # Errors
    /// [`TrainingError::TooFewRows`] for an empty matrix or a target count
    /// that differs from the row count.
    #[expect(clippy::float_arithmetic, reason = "ridge on the diagonal")]
    pub fn fit(
        rows: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
    ) -> Result<Self, TrainingError> {
        super::check_design(&rows, &targets)?;
        let ones = Array2::<f64>::ones((rows.nrows(), 1));
        let design = concatenate(Axis(1), &[ones.view(), rows.view()])?;
        let mut gram = design.t().dot(&design);
        gram.diag_mut()
            .iter_mut()
            .skip(1)
            .for_each(|diagonal| *diagonal += RIDGE);
        let moment = design.t().dot(&targets);
        let system = concatenate(Axis(1), &[gram.view(), moment.view().insert_axis(Axis(1))])?;
        let solution = solve(system);
        let (intercept, coefficients) = solution
            .as_slice()
            .and_then(<[f64]>::split_first)
            .map_or((0.0, Vec::new()), |(b, w)| (*b, w.to_vec()));
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    /// Input width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.coefficients.len()
    }

    /// Fitted intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fitted coefficients in column order.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Predict one row. Callers check the width.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "dot product")]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Gauss-Jordan elimination with partial pivoting on an augmented
/// `dim × dim+1` system. Unpivotable columns resolve to zero.
#[expect(clippy::float_arithmetic, reason = "row elimination")]
fn solve(mut system: Array2<f64>) -> Array1<f64> {
    let dim = system.nrows();
    let mut pivots: Vec<Option<usize>> = vec![None; dim];
    let mut used = vec![false; dim];
    for (col, slot) in pivots.iter_mut().enumerate() {
        let candidate = system
            .column(col)
            .iter()
            .enumerate()
            .filter(|(row, _)| used.get(*row).is_some_and(|taken| !taken))
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .filter(|(_, value)| value.abs() >= PIVOT_EPSILON)
            .map(|(row, _)| row);
        let Some(pivot) = candidate else {
            continue;
        };
        if let Some(taken) = used.get_mut(pivot) {
            *taken = true;
        }
        *slot = Some(pivot);
        let pivot_row = system.row(pivot).to_owned();
        let pivot_value = pivot_row.get(col).copied().unwrap_or(1.0);
        for (index, mut row) in system.rows_mut().into_iter().enumerate() {
            if index != pivot {
                let factor = row.get(col).copied().unwrap_or_default() / pivot_value;
                row.scaled_add(-factor, &pivot_row);
            }
        }
    }
    pivots
        .iter()
        .enumerate()
        .map(|(col, pivot)| {
            pivot
                .and_then(|row| {
                    let equation = system.row(row);
                    Some(equation.get(dim)? / equation.get(col)?)
                })
                .unwrap_or(0.0)
        })
        .collect()
}
