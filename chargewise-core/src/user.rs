//! Synthetic EV drivers used to manufacture training interactions.

use std::fmt;
use std::str::FromStr;

use geo::Point;

use crate::ChargerCategory;

/// Charger speed a user prefers when choosing a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PreferredSpeed {
    /// No preference.
    Any,
    /// Prefers fast chargers.
    Fast,
    /// Prefers superfast chargers.
    Superfast,
}

impl PreferredSpeed {
    /// Return the category this preference asks for, if any.
    #[must_use]
    pub const fn category(self) -> Option<ChargerCategory> {
        match self {
            Self::Any => None,
            Self::Fast => Some(ChargerCategory::Fast),
            Self::Superfast => Some(ChargerCategory::Superfast),
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Fast => "fast",
            Self::Superfast => "superfast",
        }
    }
}

impl fmt::Display for PreferredSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferredSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "fast" => Ok(Self::Fast),
            "superfast" => Ok(Self::Superfast),
            _ => Err(format!("unknown charger speed preference '{s}'")),
        }
    }
}

/// How often a user charges. Not used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChargingFrequency {
    /// Charges every day.
    Daily,
    /// Charges about once a week.
    Weekly,
    /// Charges now and then.
    Occasional,
}

/// A synthetic driver. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Identifier, starting at 1.
    pub id: u64,
    /// City the user was assigned to.
    pub base_city: String,
    /// Home position (`x = longitude`, `y = latitude`).
    pub home: Point<f64>,
    /// Vehicle model name.
    pub ev_model: String,
    /// Battery capacity in kWh.
    pub battery_capacity_kwh: u32,
    /// Whether price weighs on station choice.
    pub is_price_sensitive: bool,
    /// Preferred charger speed.
    pub preferred_charger_speed: PreferredSpeed,
    /// Charging habit.
    pub charging_frequency: ChargingFrequency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PreferredSpeed::Any, None)]
    #[case(PreferredSpeed::Fast, Some(ChargerCategory::Fast))]
    #[case(PreferredSpeed::Superfast, Some(ChargerCategory::Superfast))]
    fn preference_maps_to_category(
        #[case] speed: PreferredSpeed,
        #[case] expected: Option<ChargerCategory>,
    ) {
        assert_eq!(speed.category(), expected);
    }

    #[rstest]
    fn preference_round_trips_through_str() {
        for speed in [PreferredSpeed::Any, PreferredSpeed::Fast, PreferredSpeed::Superfast] {
            assert_eq!(speed.to_string().parse::<PreferredSpeed>(), Ok(speed));
        }
    }
}
