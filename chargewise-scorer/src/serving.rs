//! The JSON contract used when another process asks for recommendations.
//!
//! A request looks like:
//!
//! ```json
//! {
//!   "stations": [
//!     {"distance": 1.2, "total_connections": 2, "max_power_kw": 50,
//!      "usage_cost": 12, "charger_category": "superfast"}
//!   ],
//!   "user_preferences": {"battery_capacity_kwh": 60, "is_price_sensitive": 1}
//! }
//! ```
//!
//! The response is the array of input station objects, every field kept,
//! each with a `predicted_rating` (model) or `rule_score` (fallback) added
//! and sorted by it in descending order. Entries that are not objects or
//! lack a usable `distance` are logged and skipped. Free slots and reliability that the
//! caller did not supply are simulated from the serving seed with the same
//! simulator used for training data.

use chargewise_core::{ChargerCategory, StationFeatures, UserPreferences};
use chargewise_data::{SiteProfile, seeded_rng, simulate_conditions};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Candidate, Score, ScoringEngine, ServingError};

/// Operator assumed when a candidate names none.
const UNKNOWN_OPERATOR: &str = "Unknown";

/// Serving-time defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    /// Seed for simulated slots and reliability.
    pub seed: u64,
    /// Battery capacity assumed when the request omits it.
    pub default_battery_kwh: f64,
    /// Results kept when scoring falls back to rules.
    pub top_k: usize,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            default_battery_kwh: 45.0,
            top_k: crate::DEFAULT_TOP_K,
        }
    }
}

/// A decoded recommendation request.
///
/// Candidate entries are kept as raw JSON so a malformed station is
/// skipped on its own instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    stations: Vec<Value>,
    #[serde(default)]
    user_preferences: RawPreferences,
}

impl RecommendRequest {
    /// Decode a request body.
    ///
    /// # Errors
    /// [`ServingError::MalformedJson`] when `body` is not valid JSON of the
    /// expected shape.
    pub fn from_json(body: &str) -> Result<Self, ServingError> {
        serde_json::from_str(body).map_err(ServingError::MalformedJson)
    }

    /// Whether the request names no candidate at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Rank the candidates and encode the response array.
    ///
    /// # Errors
    /// [`ServingError::Encode`] if the response cannot be written.
    pub fn respond(
        self,
        engine: &ScoringEngine,
        config: &ServingConfig,
    ) -> Result<String, ServingError> {
        let received = self.stations.len();
        let user = self.user_preferences.resolve(config);
        let mut ranked = engine.rank(candidates(self.stations, config.seed), &user);
        if matches!(ranked.first().map(|r| r.score), Some(Score::RuleScore(_))) {
            ranked.truncate(config.top_k);
        }
        info!("scored {} of {received} candidate stations", ranked.len());

        let response: Vec<Value> = ranked
            .into_iter()
            .map(|entry| {
                let mut station = entry.payload;
                station.insert(
                    entry.score.field_name().to_owned(),
                    Value::from(entry.score.value()),
                );
                Value::Object(station)
            })
            .collect();
        serde_json::to_string(&response).map_err(ServingError::Encode)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPreferences {
    #[serde(default)]
    battery_capacity_kwh: Option<f64>,
    #[serde(default)]
    is_price_sensitive: Option<Flag>,
}

/// A boolean that callers may also send as a number.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(f64),
}

impl Flag {
    const fn is_set(self) -> bool {
        match self {
            Self::Bool(flag) => flag,
            Self::Number(value) => value.abs() > f64::EPSILON,
        }
    }
}

impl RawPreferences {
    fn resolve(&self, config: &ServingConfig) -> UserPreferences {
        UserPreferences::new(
            self.battery_capacity_kwh
                .filter(|kwh| kwh.is_finite())
                .unwrap_or(config.default_battery_kwh),
            self.is_price_sensitive.is_some_and(Flag::is_set),
        )
    }
}

fn number(station: &Map<String, Value>, key: &str) -> Option<f64> {
    station
        .get(key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn count(station: &Map<String, Value>, key: &str) -> Option<u32> {
    match station.get(key)? {
        Value::Number(number) => number
            .as_u64()
            .and_then(|whole| u32::try_from(whole).ok())
            .or_else(|| number.as_f64().and_then(whole_count)),
        _ => None,
    }
}

/// A float that is an exact count, such as `2.0`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is whole and within the u32 range"
)]
fn whole_count(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

/// Category label, derived from power when absent and `None` when present
/// but unrecognised.
fn category(station: &Map<String, Value>) -> Option<ChargerCategory> {
    match station.get("charger_category") {
        Some(Value::String(label)) => label.trim().parse().ok(),
        None | Some(Value::Null) => number(station, "max_power_kw").map(ChargerCategory::from_power_kw),
        Some(_) => None,
    }
}

fn operational(station: &Map<String, Value>) -> bool {
    match station.get("is_operational") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(value)) => value.as_f64().is_none_or(|v| v.abs() > f64::EPSILON),
        _ => true,
    }
}

/// Build scoring inputs for every object entry that has a distance.
fn candidates(stations: Vec<Value>, seed: u64) -> Vec<Candidate<Map<String, Value>>> {
    let usable: Vec<(Map<String, Value>, f64)> = stations
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let Value::Object(station) = entry else {
                warn!("skipping station {position}: not an object");
                return None;
            };
            match number(&station, "distance") {
                Some(distance) => Some((station, distance)),
                None => {
                    warn!("skipping station {position}: missing or invalid distance");
                    None
                }
            }
        })
        .collect();

    let profiles: Vec<SiteProfile<'_>> = usable
        .iter()
        .map(|(station, _)| SiteProfile {
            total_connections: count(station, "total_connections").unwrap_or(1),
            charger_category: category(station),
            operator: station
                .get("operator")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_OPERATOR),
        })
        .collect();
    let simulated = simulate_conditions(&profiles, &mut seeded_rng(seed));

    usable
        .into_iter()
        .zip(simulated)
        .map(|((station, distance_km), conditions)| {
            let total_connections = count(&station, "total_connections");
            let features = StationFeatures {
                distance_km,
                available_slots: Some(
                    count(&station, "available_slots").unwrap_or(conditions.available_slots),
                ),
                total_connections,
                max_power_kw: number(&station, "max_power_kw"),
                price_per_kwh: number(&station, "usage_cost"),
                reliability_score: Some(
                    number(&station, "reliability_score").unwrap_or(conditions.reliability_score),
                ),
                charger_category: category(&station),
                is_operational: operational(&station),
            };
            Candidate::new(station, features)
        })
        .collect()
}

/// Rank the stations in `request` and return the response array.
///
/// # Errors
/// [`ServingError::MalformedJson`] when the request is not valid JSON of
/// the expected shape, and [`ServingError::Encode`] if the response cannot
/// be written.
pub fn recommend_json(
    engine: &ScoringEngine,
    request: &str,
    config: &ServingConfig,
) -> Result<String, ServingError> {
    RecommendRequest::from_json(request)?.respond(engine, config)
}
