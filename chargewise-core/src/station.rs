//! Canonical charging stations and the conditions simulated for them.
//!
//! A [`Station`] is immutable once normalised. [`StationConditions`] hold
//! the ephemeral attributes (free slots, price, wait, reliability) that are
//! regenerated for every simulation run or serving request and are never
//! persisted as facts.

use geo::Point;
use thiserror::Error;

use crate::ChargerCategory;

/// A normalised, deduplicated charging station.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    /// Directory identifier, stable across refreshes.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// First address line.
    pub address: String,
    /// Town reported by the directory.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Country title.
    pub country: String,
    /// Geospatial position.
    pub location: Point<f64>,
    /// Distance from the search centre used when the record was fetched.
    pub distance_from_reference_km: f64,
    /// Number of connectors, at least one.
    pub total_connections: u32,
    /// Highest connector power rating in kW.
    pub max_power_kw: f64,
    /// Speed class derived from `max_power_kw`.
    pub charger_category: ChargerCategory,
    /// Distinct connector type titles.
    pub connection_types: Vec<String>,
    /// Network operator.
    pub operator: String,
    /// Whether the directory marks the station as operational.
    pub is_operational: bool,
    /// Directory status title.
    pub status: String,
    /// Raw timestamp of the last status update.
    pub last_updated: String,
    /// Upstream data provider.
    pub data_provider: String,
}

/// Errors returned by [`Station::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum StationError {
    /// Latitude or longitude is not finite or out of range.
    #[error("station {id} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates {
        /// Station identifier.
        id: u64,
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },
    /// The station lists no connectors.
    #[error("station {id} must have at least one connection")]
    NoConnections {
        /// Station identifier.
        id: u64,
    },
    /// The power rating is not a positive finite number.
    #[error("station {id} has invalid max power {max_power_kw} kW")]
    InvalidPower {
        /// Station identifier.
        id: u64,
        /// Offending power rating.
        max_power_kw: f64,
    },
    /// The stored category disagrees with the power rating.
    #[error("station {id} is labelled {found} but {expected} follows from its power rating")]
    CategoryMismatch {
        /// Station identifier.
        id: u64,
        /// Category stored on the record.
        found: ChargerCategory,
        /// Category implied by `max_power_kw`.
        expected: ChargerCategory,
    },
}

impl Station {
    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    /// Check the structural invariants of a canonical station.
    ///
    /// # Errors
    /// Returns [`StationError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), StationError> {
        let (lat, lng) = (self.latitude(), self.longitude());
        if !valid_coordinates(lat, lng) {
            return Err(StationError::InvalidCoordinates {
                id: self.id,
                lat,
                lng,
            });
        }
        if self.total_connections == 0 {
            return Err(StationError::NoConnections { id: self.id });
        }
        if !self.max_power_kw.is_finite() || self.max_power_kw <= 0.0 {
            return Err(StationError::InvalidPower {
                id: self.id,
                max_power_kw: self.max_power_kw,
            });
        }
        let expected = ChargerCategory::from_power_kw(self.max_power_kw);
        if expected != self.charger_category {
            return Err(StationError::CategoryMismatch {
                id: self.id,
                found: self.charger_category,
                expected,
            });
        }
        Ok(())
    }
}

/// Report whether a coordinate pair is finite and inside WGS84 bounds.
#[must_use]
pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Ephemeral per-run attributes of a station.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConditions {
    /// Free connectors, between zero and `total_connections`.
    pub available_slots: u32,
    /// Simulated tariff per kWh.
    pub price_per_kwh: f64,
    /// Simulated average wait in minutes.
    pub avg_wait_minutes: u32,
    /// Simulated reliability in `0.0..=1.0`.
    pub reliability_score: f64,
}

/// Errors returned by [`StationConditions::new`].
#[derive(Debug, Error, PartialEq)]
pub enum ConditionsError {
    /// More slots are free than the station has connectors.
    #[error("{available} free slots exceed {total} connections")]
    TooManySlots {
        /// Requested free slots.
        available: u32,
        /// Connector count of the station.
        total: u32,
    },
    /// Price is negative or not finite.
    #[error("price per kWh must be finite and non-negative, got {0}")]
    InvalidPrice(f64),
    /// Reliability is outside `0.0..=1.0`.
    #[error("reliability must be within 0.0..=1.0, got {0}")]
    InvalidReliability(f64),
}

impl StationConditions {
    /// Validate and construct conditions for a station with `total` connectors.
    ///
    /// # Errors
    /// Returns [`ConditionsError`] when any field falls outside its range.
    pub fn new(
        total: u32,
        available_slots: u32,
        price_per_kwh: f64,
        avg_wait_minutes: u32,
        reliability_score: f64,
    ) -> Result<Self, ConditionsError> {
        if available_slots > total {
            return Err(ConditionsError::TooManySlots {
                available: available_slots,
                total,
            });
        }
        if !price_per_kwh.is_finite() || price_per_kwh < 0.0 {
            return Err(ConditionsError::InvalidPrice(price_per_kwh));
        }
        if !(0.0..=1.0).contains(&reliability_score) {
            return Err(ConditionsError::InvalidReliability(reliability_score));
        }
        Ok(Self {
            available_slots,
            price_per_kwh,
            avg_wait_minutes,
            reliability_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::station_at;
    use rstest::rstest;

    #[rstest]
    fn sample_station_is_valid() {
        assert_eq!(station_at(1, 12.97, 77.59, 60.0).validate(), Ok(()));
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(0.0, -180.5)]
    #[case(f64::NAN, 0.0)]
    fn invalid_coordinates_are_rejected(#[case] lat: f64, #[case] lng: f64) {
        let station = station_at(7, lat, lng, 7.0);
        assert!(matches!(
            station.validate(),
            Err(StationError::InvalidCoordinates { id: 7, .. })
        ));
    }

    #[rstest]
    fn zero_connections_are_rejected() {
        let mut station = station_at(3, 0.0, 0.0, 7.0);
        station.total_connections = 0;
        assert_eq!(station.validate(), Err(StationError::NoConnections { id: 3 }));
    }

    #[rstest]
    fn mislabelled_category_is_rejected() {
        let mut station = station_at(4, 0.0, 0.0, 49.9);
        station.charger_category = ChargerCategory::Superfast;
        assert!(matches!(
            station.validate(),
            Err(StationError::CategoryMismatch {
                expected: ChargerCategory::Fast,
                ..
            })
        ));
    }

    #[rstest]
    fn conditions_reject_excess_slots() {
        let err = StationConditions::new(2, 3, 9.0, 10, 0.9).unwrap_err();
        assert_eq!(
            err,
            ConditionsError::TooManySlots {
                available: 3,
                total: 2
            }
        );
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn conditions_reject_bad_price(#[case] price: f64) {
        assert!(StationConditions::new(2, 1, price, 10, 0.9).is_err());
    }

    #[rstest]
    fn conditions_accept_boundaries() {
        assert!(StationConditions::new(4, 4, 0.0, 5, 1.0).is_ok());
        assert!(StationConditions::new(4, 0, 16.0, 44, 0.0).is_ok());
    }
}
