//! Booking events and the satisfaction ratings used as training labels.

use chargewise_core::{Booking, MAX_RATING, MIN_RATING, User, haversine_km, round_dp};
use chrono::{Duration, NaiveDateTime};
use log::debug;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand_distr::Normal;

use super::{SimulatedStation, SimulationConfig, SimulationError};

/// Operator substrings that earn a small rating bonus. Case-sensitive.
pub const PREMIUM_BRANDS: [&str; 2] = ["Tata", "Ather"];

const RATING_NOISE_SD: f64 = 0.4;
const SECONDS_PER_DAY: i64 = 86_400;

/// Unnormalised probability that `user` picks `site` at `distance_km`.
///
/// Nearer stations are preferred. Price-sensitive users favour cheap
/// tariffs, users with a speed preference favour matching chargers, and
/// users with batteries over 50 kWh favour fast and superfast chargers.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "selection weights are products of floating-point factors"
)]
pub fn selection_weight(user: &User, site: &SimulatedStation, distance_km: f64) -> f64 {
    let category = site.station.charger_category;
    let mut weight = 1.0 / (1.0 + distance_km / 5.0);
    if user.is_price_sensitive {
        weight *= 15.0 / (site.conditions.price_per_kwh + 1.0);
    }
    if let Some(preferred) = user.preferred_charger_speed.category()
        && preferred == category
    {
        weight *= 1.5;
    }
    if user.battery_capacity_kwh > 50 && category.is_rapid() {
        weight *= 1.3;
    }
    weight
}

/// Satisfaction rating before clamping and rounding.
///
/// `noise` is added as drawn; callers sample it from `N(0, 0.4)`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the rating model adds floating-point adjustments"
)]
pub fn satisfaction_rating(
    distance_km: f64,
    available_slots: u32,
    price_per_kwh: f64,
    is_price_sensitive: bool,
    operator: &str,
    noise: f64,
) -> f64 {
    let mut rating = 3.0;
    if distance_km < 3.0 {
        rating += 1.0;
    } else if distance_km < 8.0 {
        rating += 0.5;
    } else if distance_km > 20.0 {
        rating -= 0.7;
    }

    match available_slots {
        0 => rating -= 1.5,
        1 => rating -= 0.2,
        2 => {}
        _ => rating += 0.6,
    }

    if is_price_sensitive {
        if price_per_kwh < 8.0 {
            rating += 0.5;
        } else if price_per_kwh > 13.0 {
            rating -= 0.6;
        }
    }

    if PREMIUM_BRANDS.iter().any(|brand| operator.contains(brand)) {
        rating += 0.2;
    }
    rating + noise
}

/// Generate bookings for every user against stations within the booking
/// radius of their home.
///
/// Users with no station in range contribute nothing. Timestamps fall
/// uniformly between one day and `lookback_days` before `reference_time`.
///
/// # Errors
/// Returns [`SimulationError::InvalidLookback`] when the lookback does not
/// exceed one day.
pub fn generate_bookings<R: Rng + ?Sized>(
    stations: &[SimulatedStation],
    users: &[User],
    config: &SimulationConfig,
    reference_time: NaiveDateTime,
    rng: &mut R,
) -> Result<Vec<Booking>, SimulationError> {
    if config.lookback_days <= 1 {
        return Err(SimulationError::InvalidLookback {
            days: config.lookback_days,
        });
    }
    let latest_offset = i64::from(config.lookback_days) * SECONDS_PER_DAY;
    let noise = Normal::new(0.0, RATING_NOISE_SD)?;

    let mut bookings = Vec::with_capacity(users.len() * config.bookings_per_user);
    for user in users {
        let reachable: Vec<(&SimulatedStation, f64)> = stations
            .iter()
            .map(|site| (site, haversine_km(user.home, site.station.location)))
            .filter(|(_, distance)| *distance < config.booking_radius_km)
            .collect();
        if reachable.is_empty() {
            debug!("user {} has no station within range", user.id);
            continue;
        }
        let chooser = WeightedIndex::new(
            reachable
                .iter()
                .map(|(site, distance)| selection_weight(user, site, *distance)),
        )
        .ok();

        for sequence in 0..config.bookings_per_user {
            let index = match &chooser {
                Some(weighted) => weighted.sample(rng),
                None => rng.gen_range(0..reachable.len()),
            };
            let Some(&(site, distance_km)) = reachable.get(index) else {
                continue;
            };
            let offset = rng.gen_range(SECONDS_PER_DAY..latest_offset);
            let booked_at = reference_time
                .checked_sub_signed(Duration::seconds(offset))
                .unwrap_or(reference_time);
            let available_slots = rng.gen_range(0..=site.station.total_connections);
            let price = site.conditions.price_per_kwh;
            let raw_rating = satisfaction_rating(
                distance_km,
                available_slots,
                price,
                user.is_price_sensitive,
                &site.station.operator,
                noise.sample(rng),
            );
            bookings.push(Booking::record(
                user.id,
                sequence,
                site.station.id,
                booked_at,
                round_dp(distance_km, 2),
                available_slots,
                price,
                round_dp(raw_rating.clamp(MIN_RATING, MAX_RATING), 1),
                site.conditions.avg_wait_minutes,
            ));
        }
    }
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargewise_core::test_support::{station_at, user_at};
    use chargewise_core::{ChargerCategory, PreferredSpeed, StationConditions};
    use rstest::rstest;

    fn site(max_power_kw: f64, price: f64) -> SimulatedStation {
        SimulatedStation {
            station: station_at(1, 12.97, 77.59, max_power_kw),
            conditions: StationConditions::new(2, 1, price, 10, 0.9).expect("valid conditions"),
        }
    }

    #[rstest]
    #[case(2.0, 2, 10.0, false, "Unknown", 4.0)]
    #[case(5.0, 0, 10.0, false, "Unknown", 2.0)]
    #[case(25.0, 3, 7.5, true, "Tata Power", 3.6)]
    #[case(10.0, 1, 14.0, true, "Ather Energy", 2.4)]
    #[case(12.0, 2, 14.0, false, "tata", 3.0)]
    #[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
    fn rating_model_without_noise(
        #[case] distance: f64,
        #[case] slots: u32,
        #[case] price: f64,
        #[case] sensitive: bool,
        #[case] operator: &str,
        #[case] expected: f64,
    ) {
        let rating = satisfaction_rating(distance, slots, price, sensitive, operator, 0.0);
        assert!((rating - expected).abs() < 1e-9, "got {rating}");
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
    fn nearer_stations_weigh_more() {
        let user = user_at(1, 12.97, 77.59);
        let station = site(22.0, 10.0);
        assert!((selection_weight(&user, &station, 0.0) - 1.0).abs() < 1e-12);
        assert!((selection_weight(&user, &station, 5.0) - 0.5).abs() < 1e-12);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
    fn preferences_multiply_weight() {
        let mut user = user_at(1, 12.97, 77.59);
        user.is_price_sensitive = true;
        user.preferred_charger_speed = PreferredSpeed::Superfast;
        user.battery_capacity_kwh = 72;
        let station = site(60.0, 14.0);
        assert_eq!(station.station.charger_category, ChargerCategory::Superfast);
        // 1.0 * 15/15 * 1.5 * 1.3
        assert!((selection_weight(&user, &station, 0.0) - 1.95).abs() < 1e-12);
    }

    #[rstest]
    fn short_lookback_is_rejected() {
        let config = SimulationConfig {
            lookback_days: 1,
            ..SimulationConfig::default()
        };
        let err = generate_bookings(
            &[],
            &[],
            &config,
            NaiveDateTime::default(),
            &mut crate::seeded_rng(1),
        )
        .expect_err("lookback too short");
        assert!(matches!(err, SimulationError::InvalidLookback { days: 1 }));
    }
}
