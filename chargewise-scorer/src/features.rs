//! The feature schema shared by training and inference.
//!
//! A [`FeatureSchema`] is an ordered list of named slots plus the distance
//! bucketing scheme. It is fixed when a model is trained and stored in the
//! artefact; [`FeatureBuilder`] is the only code that turns a station and a
//! user into a vector, and it always emits exactly one value per slot in
//! schema order.

use std::fmt;
use std::str::FromStr;

use chargewise_core::{StationFeatures, UserPreferences};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::{CategoryEncoder, FeatureError};

/// Reliability assumed when a candidate carries none.
pub const DEFAULT_RELIABILITY: f64 = 0.8;
/// Hour of day used when no timestamp is available.
pub const DEFAULT_HOUR: u32 = 12;

/// Every feature the builder knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureName {
    /// Distance from the user in kilometres.
    DistanceKm,
    /// Bucketed distance.
    DistanceCategory,
    /// Free connectors.
    AvailableSlots,
    /// Connector count.
    TotalConnections,
    /// Peak power in kW.
    MaxPowerKw,
    /// Tariff per kWh.
    PricePerKwh,
    /// Reliability in `0.0..=1.0`.
    ReliabilityScore,
    /// Encoded charger category.
    ChargerTypeEncoded,
    /// Battery capacity in kWh.
    BatteryCapacity,
    /// 1 for price-sensitive users.
    IsPriceSensitive,
    /// Free connectors over connector count.
    AvailabilityRatio,
    /// Tariff times distance.
    PricePerKm,
    /// Peak power over tariff.
    PowerEfficiency,
    /// Peak power times availability over tariff.
    ValueScore,
    /// 1 on Saturdays and Sundays.
    IsWeekend,
    /// Hour of the booking.
    HourOfDay,
}

impl FeatureName {
    /// Features every schema starts with, in order.
    pub const BASE: [Self; 14] = [
        Self::DistanceKm,
        Self::DistanceCategory,
        Self::AvailableSlots,
        Self::TotalConnections,
        Self::MaxPowerKw,
        Self::PricePerKwh,
        Self::ReliabilityScore,
        Self::ChargerTypeEncoded,
        Self::BatteryCapacity,
        Self::IsPriceSensitive,
        Self::AvailabilityRatio,
        Self::PricePerKm,
        Self::PowerEfficiency,
        Self::ValueScore,
    ];

    /// Time features appended when bookings carry timestamps.
    pub const TIME: [Self; 2] = [Self::IsWeekend, Self::HourOfDay];

    /// Column name as stored in artefacts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DistanceKm => "distance_km",
            Self::DistanceCategory => "distance_category",
            Self::AvailableSlots => "available_slots",
            Self::TotalConnections => "total_connections",
            Self::MaxPowerKw => "max_power_kw",
            Self::PricePerKwh => "price_per_kwh",
            Self::ReliabilityScore => "reliability_score",
            Self::ChargerTypeEncoded => "charger_type_encoded",
            Self::BatteryCapacity => "battery_capacity",
            Self::IsPriceSensitive => "is_price_sensitive",
            Self::AvailabilityRatio => "availability_ratio",
            Self::PricePerKm => "price_per_km",
            Self::PowerEfficiency => "power_efficiency",
            Self::ValueScore => "value_score",
            Self::IsWeekend => "is_weekend",
            Self::HourOfDay => "hour_of_day",
        }
    }

    fn all() -> impl Iterator<Item = Self> {
        Self::BASE.into_iter().chain(Self::TIME)
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown feature '{s}'"))
    }
}

/// One column of a stored schema.
///
/// Names that this build does not recognise are kept so the vector width
/// still matches the fitted scaler; they are filled with zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureSlot {
    /// A feature the builder computes.
    Known(FeatureName),
    /// A stored name with no computation; always zero.
    Unknown(String),
}

impl From<String> for FeatureSlot {
    fn from(name: String) -> Self {
        name.parse().map_or(Self::Unknown(name), Self::Known)
    }
}

impl From<FeatureSlot> for String {
    fn from(slot: FeatureSlot) -> Self {
        match slot {
            FeatureSlot::Known(name) => name.as_str().to_owned(),
            FeatureSlot::Unknown(name) => name,
        }
    }
}

impl FeatureSlot {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Known(name) => name.as_str(),
            Self::Unknown(name) => name,
        }
    }
}

/// How `distance_category` buckets distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceBuckets {
    /// `≤5 → 0`, `≤15 → 1`, `≤30 → 2`, otherwise 3. Used for training.
    Quartile,
    /// `<5 → 1`, `<15 → 2`, otherwise 3.
    Tertile,
}

impl DistanceBuckets {
    /// Bucket label for `distance_km`.
    #[must_use]
    pub const fn bucket(self, distance_km: f64) -> f64 {
        match self {
            Self::Quartile => {
                if distance_km <= 5.0 {
                    0.0
                } else if distance_km <= 15.0 {
                    1.0
                } else if distance_km <= 30.0 {
                    2.0
                } else {
                    3.0
                }
            }
            Self::Tertile => {
                if distance_km < 5.0 {
                    1.0
                } else if distance_km < 15.0 {
                    2.0
                } else {
                    3.0
                }
            }
        }
    }
}

/// Ordered feature slots and the bucketing scheme they were trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
    buckets: DistanceBuckets,
}

impl FeatureSchema {
    /// Build a schema from explicit slots.
    #[must_use]
    pub const fn new(slots: Vec<FeatureSlot>, buckets: DistanceBuckets) -> Self {
        Self { slots, buckets }
    }

    /// The schema new models are trained with: every base feature, then
    /// the time features, with quartile distance buckets.
    #[must_use]
    pub fn training() -> Self {
        Self::new(
            FeatureName::all().map(FeatureSlot::Known).collect(),
            DistanceBuckets::Quartile,
        )
    }

    /// Slots in order.
    #[must_use]
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name().to_owned()).collect()
    }

    /// Distance bucketing scheme.
    #[must_use]
    pub const fn buckets(&self) -> DistanceBuckets {
        self.buckets
    }

    /// Number of columns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema has no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `name` is one of the columns.
    #[must_use]
    pub fn contains(&self, name: FeatureName) -> bool {
        self.slots.contains(&FeatureSlot::Known(name))
    }

    /// Number of columns the builder can compute.
    #[must_use]
    pub fn known_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, FeatureSlot::Known(_)))
            .count()
    }
}

/// Turns one (station, user, time) triple into a vector in schema order.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder<'a> {
    schema: &'a FeatureSchema,
    encoder: &'a CategoryEncoder,
}

impl<'a> FeatureBuilder<'a> {
    /// Bind a schema to the encoder fitted alongside it.
    #[must_use]
    pub const fn new(schema: &'a FeatureSchema, encoder: &'a CategoryEncoder) -> Self {
        Self { schema, encoder }
    }

    /// Build the vector for one station.
    ///
    /// `booked_at` feeds the time features; without it they default to a
    /// weekday at noon. Missing optional inputs degrade to zero, except
    /// reliability which defaults to [`DEFAULT_RELIABILITY`].
    ///
    /// # Errors
    /// Returns [`FeatureError`] when the category cannot be encoded or a
    /// derived value is not finite.
    pub fn build(
        &self,
        station: &StationFeatures,
        user: &UserPreferences,
        booked_at: Option<NaiveDateTime>,
    ) -> Result<Vec<f64>, FeatureError> {
        let inputs = Inputs::new(station, user, booked_at);
        self.schema
            .slots
            .iter()
            .map(|slot| match slot {
                FeatureSlot::Unknown(_) => Ok(0.0),
                FeatureSlot::Known(name) => {
                    let value = self.value(*name, &inputs)?;
                    if value.is_finite() {
                        Ok(value)
                    } else {
                        Err(FeatureError::NonFinite {
                            feature: name.as_str().to_owned(),
                        })
                    }
                }
            })
            .collect()
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "derived features are ratios and products of station inputs"
    )]
    fn value(&self, name: FeatureName, inputs: &Inputs) -> Result<f64, FeatureError> {
        let value = match name {
            FeatureName::DistanceKm => inputs.distance,
            FeatureName::DistanceCategory => self.schema.buckets.bucket(inputs.distance),
            FeatureName::AvailableSlots => inputs.slots.unwrap_or(0.0),
            FeatureName::TotalConnections => inputs.total.unwrap_or(0.0),
            FeatureName::MaxPowerKw => inputs.power.unwrap_or(0.0),
            FeatureName::PricePerKwh => inputs.price.unwrap_or(0.0),
            FeatureName::ReliabilityScore => inputs.reliability,
            FeatureName::ChargerTypeEncoded => self.encoder.transform(inputs.category)?,
            FeatureName::BatteryCapacity => inputs.battery,
            FeatureName::IsPriceSensitive => inputs.price_sensitive,
            FeatureName::AvailabilityRatio => inputs.availability_ratio(),
            FeatureName::PricePerKm => inputs.price.unwrap_or(0.0) * inputs.distance,
            FeatureName::PowerEfficiency => inputs.power_efficiency(),
            FeatureName::ValueScore => inputs.power_efficiency() * inputs.availability_ratio(),
            FeatureName::IsWeekend => inputs.is_weekend,
            FeatureName::HourOfDay => inputs.hour,
        };
        Ok(value)
    }
}

/// Builder inputs with optional values widened to `f64`.
struct Inputs {
    distance: f64,
    slots: Option<f64>,
    total: Option<f64>,
    power: Option<f64>,
    price: Option<f64>,
    reliability: f64,
    category: Option<chargewise_core::ChargerCategory>,
    battery: f64,
    price_sensitive: f64,
    is_weekend: f64,
    hour: f64,
}

impl Inputs {
    fn new(
        station: &StationFeatures,
        user: &UserPreferences,
        booked_at: Option<NaiveDateTime>,
    ) -> Self {
        let (is_weekend, hour) = booked_at.map_or((false, DEFAULT_HOUR), |at| {
            (matches!(at.weekday(), Weekday::Sat | Weekday::Sun), at.hour())
        });
        Self {
            distance: station.distance_km,
            slots: station.available_slots.map(f64::from),
            total: station.total_connections.map(f64::from),
            power: station.max_power_kw,
            price: station.price_per_kwh,
            reliability: station.reliability_score.unwrap_or(DEFAULT_RELIABILITY),
            category: station.charger_category,
            battery: user.battery_capacity_kwh,
            price_sensitive: f64::from(u8::from(user.is_price_sensitive)),
            is_weekend: f64::from(u8::from(is_weekend)),
            hour: f64::from(hour),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "ratio of connector counts")]
    const fn availability_ratio(&self) -> f64 {
        match (self.slots, self.total) {
            (Some(slots), Some(total)) if total > 0.0 => slots / total,
            _ => 0.0,
        }
    }

    #[expect(clippy::float_arithmetic, reason = "ratio of power to tariff")]
    const fn power_efficiency(&self) -> f64 {
        match (self.power, self.price) {
            (Some(power), Some(price)) if price > 0.0 => power / price,
            _ => 0.0,
        }
    }
}
