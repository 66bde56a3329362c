//! Scoring inputs shared by training and serving.
//!
//! Training assembles a [`StationFeatures`] from a canonical station, the
//! conditions observed at booking time and the booking distance. Serving
//! assembles the same struct from a candidate payload. Optional fields
//! capture data that may be missing at serving time; feature derivation
//! decides how absences degrade.

use crate::{ChargerCategory, Station, StationConditions, User};

/// Station-side inputs to scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationFeatures {
    /// Distance from the user in kilometres.
    pub distance_km: f64,
    /// Free connectors.
    pub available_slots: Option<u32>,
    /// Connector count.
    pub total_connections: Option<u32>,
    /// Peak power in kW.
    pub max_power_kw: Option<f64>,
    /// Tariff per kWh.
    pub price_per_kwh: Option<f64>,
    /// Reliability in `0.0..=1.0`.
    pub reliability_score: Option<f64>,
    /// Speed class, `None` when the source label was not recognised.
    pub charger_category: Option<ChargerCategory>,
    /// Whether the station is operational.
    pub is_operational: bool,
}

impl StationFeatures {
    /// Combine a canonical station with the conditions observed for it.
    ///
    /// Static attributes (connector count, power, category, operational
    /// flag) always come from `station`; availability, price and
    /// reliability come from `conditions`.
    #[must_use]
    pub const fn observe(
        station: &Station,
        conditions: &StationConditions,
        distance_km: f64,
    ) -> Self {
        Self {
            distance_km,
            available_slots: Some(conditions.available_slots),
            total_connections: Some(station.total_connections),
            max_power_kw: Some(station.max_power_kw),
            price_per_kwh: Some(conditions.price_per_kwh),
            reliability_score: Some(conditions.reliability_score),
            charger_category: Some(station.charger_category),
            is_operational: station.is_operational,
        }
    }
}

/// User-side inputs to scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserPreferences {
    /// Battery capacity in kWh.
    pub battery_capacity_kwh: f64,
    /// Whether price weighs on station choice.
    pub is_price_sensitive: bool,
}

impl UserPreferences {
    /// Construct preferences from raw values.
    #[must_use]
    pub const fn new(battery_capacity_kwh: f64, is_price_sensitive: bool) -> Self {
        Self {
            battery_capacity_kwh,
            is_price_sensitive,
        }
    }
}

impl From<&User> for UserPreferences {
    fn from(user: &User) -> Self {
        Self::new(f64::from(user.battery_capacity_kwh), user.is_price_sensitive)
    }
}
