//! Seeded simulation of station conditions, users and bookings.
//!
//! No real booking history exists, so training labels are manufactured:
//! every station gets simulated availability, price, wait and
//! reliability; synthetic users are spread across cities in proportion to
//! station counts; each user books nearby stations with a preference
//! model and rates them with a hand-tuned satisfaction model.
//!
//! Each batch takes an explicit random generator. [`simulate_dataset`]
//! seeds a fresh [`ChaCha8Rng`] from the configured seed for every batch,
//! so a given station set and seed always yield the same dataset.

use chargewise_core::{Booking, Station, StationConditions, User};
use chrono::NaiveDateTime;
use log::info;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod bookings;
mod conditions;
mod users;

pub use bookings::{
    PREMIUM_BRANDS, generate_bookings, satisfaction_rating, selection_weight,
};
pub use conditions::{MAJOR_OPERATORS, SiteProfile, price_band, simulate_conditions};
pub use users::generate_users;

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of synthetic users.
    pub users: usize,
    /// Booking attempts per user.
    pub bookings_per_user: usize,
    /// Seed shared by every batch.
    pub seed: u64,
    /// Stations farther than this from a user's home are never booked.
    pub booking_radius_km: f64,
    /// Bookings fall between one day and this many days before the
    /// reference time.
    pub lookback_days: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            users: 300,
            bookings_per_user: 4,
            seed: 42,
            booking_radius_km: 50.0,
            lookback_days: 180,
        }
    }
}

/// Errors raised while simulating a dataset.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Users cannot be placed without stations to derive city centres.
    #[error("cannot generate users without stations")]
    NoStations,
    /// The lookback window does not cover at least one full day.
    #[error("lookback of {days} days must exceed one day")]
    InvalidLookback {
        /// Configured lookback.
        days: u32,
    },
    /// A categorical menu has unusable weights.
    #[error("invalid weights for {menu}")]
    Weights {
        /// Menu being sampled.
        menu: &'static str,
        /// Source error from `rand`.
        #[source]
        source: WeightedError,
    },
    /// The home-location jitter distribution could not be built.
    #[error("invalid jitter distribution")]
    Jitter(#[from] rand_distr::NormalError),
}

/// A canonical station paired with the conditions simulated for this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedStation {
    /// Canonical station.
    pub station: Station,
    /// Conditions for this run.
    pub conditions: StationConditions,
}

/// The three tables produced by a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDataset {
    /// Stations with their simulated conditions.
    pub stations: Vec<SimulatedStation>,
    /// Synthetic users.
    pub users: Vec<User>,
    /// Synthetic bookings.
    pub bookings: Vec<Booking>,
}

/// Deterministic generator used by every simulation batch.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Run the full simulation over `stations`.
///
/// `reference_time` anchors booking timestamps so the output does not
/// depend on the wall clock.
///
/// # Errors
/// Returns [`SimulationError`] when there are no stations or the
/// configuration is unusable.
pub fn simulate_dataset(
    stations: Vec<Station>,
    config: &SimulationConfig,
    reference_time: NaiveDateTime,
) -> Result<SimulatedDataset, SimulationError> {
    if stations.is_empty() {
        return Err(SimulationError::NoStations);
    }
    let profiles: Vec<SiteProfile<'_>> = stations.iter().map(SiteProfile::from).collect();
    let all_conditions = simulate_conditions(&profiles, &mut seeded_rng(config.seed));
    let users = generate_users(&stations, config.users, &mut seeded_rng(config.seed))?;

    let simulated: Vec<SimulatedStation> = stations
        .into_iter()
        .zip(all_conditions)
        .map(|(station, conditions)| SimulatedStation {
            station,
            conditions,
        })
        .collect();
    let bookings = generate_bookings(
        &simulated,
        &users,
        config,
        reference_time,
        &mut seeded_rng(config.seed),
    )?;
    info!(
        "simulated {} bookings for {} users over {} stations",
        bookings.len(),
        users.len(),
        simulated.len()
    );
    Ok(SimulatedDataset {
        stations: simulated,
        users,
        bookings,
    })
}

/// A fixed categorical distribution.
#[derive(Debug, Clone)]
pub(crate) struct Menu<T: Copy> {
    values: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Copy> Menu<T> {
    pub(crate) fn new(name: &'static str, options: &[(T, f64)]) -> Result<Self, SimulationError> {
        let index = WeightedIndex::new(options.iter().map(|(_, weight)| *weight))
            .map_err(|source| SimulationError::Weights { menu: name, source })?;
        Ok(Self {
            values: options.iter().map(|(value, _)| *value).collect(),
            index,
        })
    }

    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        self.values.get(self.index.sample(rng)).copied()
    }
}

#[cfg(test)]
mod tests;
