//! Join simulated bookings back to users and stations.
//!
//! A training row pairs what was observed at booking time (distance, free
//! slots, price paid, timestamp) with the static attributes of the
//! canonical station and the booking user's preferences. Static station
//! attributes are never read from the booking.

use std::collections::{BTreeMap, HashMap};

use chargewise_core::{Booking, StationFeatures, User, UserPreferences};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SimulatedDataset, SimulatedStation};

/// One labelled training row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingExample {
    /// Station-side inputs as observed at booking time.
    pub station: StationFeatures,
    /// Booking user's preferences.
    pub user: UserPreferences,
    /// When the booking happened.
    pub booked_at: NaiveDateTime,
    /// Satisfaction rating used as the regression target.
    pub rating: f64,
}

/// Counters from a join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReport {
    /// Bookings offered to the join.
    pub bookings: usize,
    /// Bookings that produced a row.
    pub joined: usize,
    /// Bookings dropped because their user or station is unknown.
    pub dangling: usize,
}

/// Errors raised by [`TrainingSet::join`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    /// No booking matched both a known user and a known station.
    #[error("none of {bookings} bookings matched a known user and station")]
    NoRows {
        /// Bookings offered to the join.
        bookings: usize,
    },
}

/// Labelled rows ready for feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
    report: JoinReport,
}

impl TrainingSet {
    /// Inner-join bookings with their user and station.
    ///
    /// Bookings whose user or station is unknown are logged and dropped.
    ///
    /// # Errors
    /// Returns [`JoinError::NoRows`] when nothing survives the join.
    pub fn join(
        stations: &[SimulatedStation],
        users: &[User],
        bookings: &[Booking],
    ) -> Result<Self, JoinError> {
        let stations_by_id: HashMap<u64, &SimulatedStation> =
            stations.iter().map(|s| (s.station.id, s)).collect();
        let users_by_id: HashMap<u64, &User> = users.iter().map(|u| (u.id, u)).collect();

        let mut report = JoinReport {
            bookings: bookings.len(),
            ..JoinReport::default()
        };
        let mut examples = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let (Some(site), Some(user)) = (
                stations_by_id.get(&booking.station_id),
                users_by_id.get(&booking.user_id),
            ) else {
                warn!(
                    "dropping booking {}: unknown user {} or station {}",
                    booking.booking_id, booking.user_id, booking.station_id
                );
                report.dangling += 1;
                continue;
            };
            examples.push(TrainingExample {
                station: booking_features(site, booking),
                user: UserPreferences::from(*user),
                booked_at: booking.booked_at,
                rating: booking.user_rating,
            });
        }
        report.joined = examples.len();
        if examples.is_empty() {
            return Err(JoinError::NoRows {
                bookings: report.bookings,
            });
        }
        info!(
            "joined {} of {} bookings ({} dangling)",
            report.joined, report.bookings, report.dangling
        );
        Ok(Self { examples, report })
    }

    /// Join the tables of a simulation run.
    ///
    /// # Errors
    /// See [`TrainingSet::join`].
    pub fn from_dataset(dataset: &SimulatedDataset) -> Result<Self, JoinError> {
        Self::join(&dataset.stations, &dataset.users, &dataset.bookings)
    }

    /// Joined rows in booking order.
    #[must_use]
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Join counters.
    #[must_use]
    pub const fn report(&self) -> JoinReport {
        self.report
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the set has no rows. Always false for a successful join.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

const fn booking_features(site: &SimulatedStation, booking: &Booking) -> StationFeatures {
    StationFeatures {
        distance_km: booking.distance_km,
        available_slots: Some(booking.available_slots_at_booking),
        total_connections: Some(site.station.total_connections),
        max_power_kw: Some(site.station.max_power_kw),
        price_per_kwh: Some(booking.price_paid_per_kwh),
        reliability_score: Some(site.conditions.reliability_score),
        charger_category: Some(site.station.charger_category),
        is_operational: site.station.is_operational,
    }
}

/// Descriptive statistics of a simulated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Station count.
    pub stations: usize,
    /// User count.
    pub users: usize,
    /// Booking count.
    pub bookings: usize,
    /// Distinct station cities, sorted.
    pub cities: Vec<String>,
    /// Stations per charger category.
    pub stations_per_category: BTreeMap<String, usize>,
    /// Lowest and highest simulated tariff.
    pub price_range: Option<(f64, f64)>,
    /// Users per battery capacity in kWh.
    pub battery_distribution: BTreeMap<u32, usize>,
    /// Share of price-sensitive users in `0.0..=1.0`.
    pub price_sensitive_share: f64,
    /// Bookings per rating, keyed by the rating formatted to one decimal.
    pub rating_distribution: BTreeMap<String, usize>,
    /// Share of completed bookings in `0.0..=1.0`.
    pub booking_success_rate: f64,
    /// Mean booking distance in kilometres.
    pub mean_booking_distance_km: f64,
}

impl DatasetSummary {
    /// Summarise a simulation run.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "shares and means divide bounded counts"
    )]
    pub fn from_dataset(dataset: &SimulatedDataset) -> Self {
        let mut cities: Vec<String> = dataset
            .stations
            .iter()
            .map(|s| s.station.city.clone())
            .collect();
        cities.sort();
        cities.dedup();

        let mut stations_per_category = BTreeMap::new();
        for site in &dataset.stations {
            *stations_per_category
                .entry(site.station.charger_category.to_string())
                .or_insert(0) += 1;
        }

        let price_range = dataset
            .stations
            .iter()
            .map(|s| s.conditions.price_per_kwh)
            .fold(None, |range: Option<(f64, f64)>, price| {
                Some(range.map_or((price, price), |(low, high)| {
                    (low.min(price), high.max(price))
                }))
            });

        let mut battery_distribution = BTreeMap::new();
        for user in &dataset.users {
            *battery_distribution
                .entry(user.battery_capacity_kwh)
                .or_insert(0) += 1;
        }
        let sensitive = dataset.users.iter().filter(|u| u.is_price_sensitive).count();

        let mut rating_distribution = BTreeMap::new();
        for booking in &dataset.bookings {
            *rating_distribution
                .entry(format!("{:.1}", booking.user_rating))
                .or_insert(0) += 1;
        }
        let completed = dataset
            .bookings
            .iter()
            .filter(|b| b.booking_completed)
            .count();
        let total_distance: f64 = dataset.bookings.iter().map(|b| b.distance_km).sum();

        let share = |part: usize, whole: usize| {
            if whole == 0 {
                0.0
            } else {
                part as f64 / whole as f64
            }
        };
        Self {
            stations: dataset.stations.len(),
            users: dataset.users.len(),
            bookings: dataset.bookings.len(),
            cities,
            stations_per_category,
            price_range,
            battery_distribution,
            price_sensitive_share: share(sensitive, dataset.users.len()),
            rating_distribution,
            booking_success_rate: share(completed, dataset.bookings.len()),
            mean_booking_distance_km: if dataset.bookings.is_empty() {
                0.0
            } else {
                total_distance / dataset.bookings.len() as f64
            },
        }
    }
}
