//! Regression metrics over paired actual and predicted ratings.

/// Root mean squared error; zero for empty input.
#[must_use]
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual, predicted, |delta| delta.powi(2)).sqrt()
}

/// Mean absolute error; zero for empty input.
#[must_use]
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual, predicted, f64::abs)
}

/// Coefficient of determination.
///
/// A constant target yields 1 for a perfect fit and 0 otherwise.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "sums of squares"
)]
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let total: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let residual: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    if total <= f64::EPSILON {
        return if residual <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - residual / total
}

/// Smallest and largest value, or `None` for empty input.
#[must_use]
pub fn range(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, value| {
        Some(acc.map_or((*value, *value), |(low, high): (f64, f64)| {
            (low.min(*value), high.max(*value))
        }))
    })
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "mean of per-row errors"
)]
fn mean_of(actual: &[f64], predicted: &[f64], error: impl Fn(f64) -> f64) -> f64 {
    let count = actual.len().min(predicted.len());
    if count == 0 {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| error(y - p))
        .sum();
    total / count as f64
}
