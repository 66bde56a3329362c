//! Closed-form scoring used when no trained model is available.
//!
//! ```text
//! score = distance / (d + 1) + slots * n + price / (p + 1)
//!       + power * (kW / 50) + operational * [is operational]
//!       + price_sensitive / (p + 1)            if the user is price-sensitive
//!       + fast_bonus                           if battery > threshold and rapid
//! ```
//!
//! Missing slots, price or power count as zero. Scores are unbounded and
//! only meaningful relative to each other.

use std::convert::Infallible;

use chargewise_core::{StationFeatures, StationScorer, UserPreferences};
use serde::{Deserialize, Serialize};

/// Power that earns one full unit of the power weight.
const REFERENCE_POWER_KW: f64 = 50.0;

/// Weights of the rule-based formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    /// Numerator of the distance term.
    pub distance: f64,
    /// Points per free connector.
    pub slots: f64,
    /// Numerator of the price term.
    pub price: f64,
    /// Points per 50 kW of peak power.
    pub power: f64,
    /// Points for an operational station.
    pub operational: f64,
    /// Extra price numerator for price-sensitive users.
    pub price_sensitive: f64,
    /// Bonus for rapid chargers when the battery is large.
    pub fast_bonus: f64,
    /// Battery capacity in kWh above which the rapid bonus applies.
    pub battery_threshold_kwh: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            distance: 30.0,
            slots: 25.0,
            price: 20.0,
            power: 15.0,
            operational: 10.0,
            price_sensitive: 15.0,
            fast_bonus: 10.0,
            battery_threshold_kwh: 50.0,
        }
    }
}

/// Scores stations with [`RuleWeights`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleBasedScorer {
    weights: RuleWeights,
}

impl RuleBasedScorer {
    /// Scorer with custom weights.
    #[must_use]
    pub const fn new(weights: RuleWeights) -> Self {
        Self { weights }
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &RuleWeights {
        &self.weights
    }

    /// Score one station. Never fails.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "weighted sum of station inputs")]
    pub fn rule_score(&self, station: &StationFeatures, user: &UserPreferences) -> f64 {
        let w = &self.weights;
        let slots = station.available_slots.map_or(0.0, f64::from);
        let price = station.price_per_kwh.unwrap_or(0.0);
        let power = station.max_power_kw.unwrap_or(0.0);
        let operational = if station.is_operational { 1.0 } else { 0.0 };

        let mut score = w.distance / (station.distance_km + 1.0)
            + w.slots * slots
            + w.price / (price + 1.0)
            + w.power * (power / REFERENCE_POWER_KW)
            + w.operational * operational;
        if user.is_price_sensitive {
            score += w.price_sensitive / (price + 1.0);
        }
        let rapid = station
            .charger_category
            .is_some_and(chargewise_core::ChargerCategory::is_rapid);
        if user.battery_capacity_kwh > w.battery_threshold_kwh && rapid {
            score += w.fast_bonus;
        }
        score
    }
}

impl StationScorer for RuleBasedScorer {
    type Error = Infallible;

    fn score(&self, station: &StationFeatures, user: &UserPreferences) -> Result<f64, Infallible> {
        Ok(self.rule_score(station, user))
    }
}
