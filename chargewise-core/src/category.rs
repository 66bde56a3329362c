//! Charger speed categories derived from peak connector power.
//!
//! The thresholds are fixed invariants of the system: training labels and
//! serving-time features must agree on them, so they are constants rather
//! than configuration.
//!
//! # Examples
//! ```
//! use chargewise_core::ChargerCategory;
//!
//! assert_eq!(ChargerCategory::from_power_kw(50.0), ChargerCategory::Superfast);
//! assert_eq!(ChargerCategory::Fast.to_string(), "fast");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Minimum peak power, in kW, for a [`ChargerCategory::Fast`] station.
pub const FAST_THRESHOLD_KW: f64 = 22.0;
/// Minimum peak power, in kW, for a [`ChargerCategory::Superfast`] station.
pub const SUPERFAST_THRESHOLD_KW: f64 = 50.0;

/// Discretised charging speed class.
///
/// Ordering follows the lexical order of the names so that encoders fitted
/// over a set of categories assign stable indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChargerCategory {
    /// At least 22 kW and below 50 kW.
    Fast,
    /// Below 22 kW.
    Slow,
    /// 50 kW and above.
    Superfast,
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown charger category '{0}'")]
pub struct ParseCategoryError(pub String);

impl ChargerCategory {
    /// Classify a peak power rating.
    ///
    /// # Examples
    /// ```
    /// use chargewise_core::ChargerCategory;
    ///
    /// assert_eq!(ChargerCategory::from_power_kw(21.9), ChargerCategory::Slow);
    /// assert_eq!(ChargerCategory::from_power_kw(22.0), ChargerCategory::Fast);
    /// ```
    #[must_use]
    pub fn from_power_kw(max_power_kw: f64) -> Self {
        if max_power_kw >= SUPERFAST_THRESHOLD_KW {
            Self::Superfast
        } else if max_power_kw >= FAST_THRESHOLD_KW {
            Self::Fast
        } else {
            Self::Slow
        }
    }

    /// Return the category as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Slow => "slow",
            Self::Superfast => "superfast",
        }
    }

    /// Report whether the category counts as rapid charging.
    #[must_use]
    pub const fn is_rapid(self) -> bool {
        matches!(self, Self::Fast | Self::Superfast)
    }
}

impl fmt::Display for ChargerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargerCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "slow" => Ok(Self::Slow),
            "superfast" => Ok(Self::Superfast),
            _ => Err(ParseCategoryError(s.to_owned())),
        }
    }
}
