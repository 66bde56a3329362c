//! Score candidate stations for a user.
//!
//! The `StationScorer` trait is the seam between the learned model and the
//! closed-form fallback. Both receive the same [`StationFeatures`] and
//! [`UserPreferences`], so swapping strategies never changes what the
//! caller has to assemble.

use crate::{StationFeatures, UserPreferences};

/// Assign a desirability score to a candidate station.
///
/// Higher is better. Implementations must be thread-safe so a serving
/// process can share one scorer across requests, and must return finite
/// scores. Failures are per-station: callers drop the station and carry on
/// with the rest of the batch.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use chargewise_core::{ChargerCategory, StationFeatures, StationScorer, UserPreferences};
///
/// struct Nearest;
///
/// impl StationScorer for Nearest {
///     type Error = Infallible;
///
///     fn score(&self, station: &StationFeatures, _: &UserPreferences) -> Result<f64, Infallible> {
///         Ok(-station.distance_km)
///     }
/// }
///
/// let station = StationFeatures {
///     distance_km: 2.0,
///     available_slots: Some(1),
///     total_connections: Some(2),
///     max_power_kw: Some(22.0),
///     price_per_kwh: Some(9.0),
///     reliability_score: None,
///     charger_category: Some(ChargerCategory::Fast),
///     is_operational: true,
/// };
/// let user = UserPreferences::new(45.0, false);
/// assert_eq!(Nearest.score(&station, &user), Ok(-2.0));
/// ```
pub trait StationScorer: Send + Sync {
    /// Per-station failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return a score for `station` according to `user`.
    ///
    /// # Errors
    /// Returns `Self::Error` when this station cannot be scored.
    fn score(&self, station: &StationFeatures, user: &UserPreferences) -> Result<f64, Self::Error>;
}
