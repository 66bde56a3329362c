//! End-to-end checks of a seeded simulation run.

use super::*;
use chargewise_core::test_support::station_in_city;
use chrono::NaiveDate;
use geo::Point;
use rstest::{fixture, rstest};
use std::collections::HashSet;

#[fixture]
fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp")
}

#[fixture]
fn stations() -> Vec<Station> {
    let spots = [
        (1, "Bangalore", 77.59, 12.97, "Tata Power", 3),
        (2, "Bangalore", 77.61, 12.93, "Statiq", 2),
        (3, "Bangalore", 77.64, 12.99, "Ather Grid", 4),
        (4, "Bangalore", 77.55, 13.01, "ChargeZone", 1),
        (5, "Mumbai", 72.88, 19.08, "BPCL", 2),
        (6, "Mumbai", 72.83, 19.05, "Jio-bp", 3),
    ];
    spots
        .into_iter()
        .map(|(id, city, lng, lat, operator, total)| {
            station_in_city(id, city, Point::new(lng, lat), operator, total)
        })
        .collect()
}

#[fixture]
fn config() -> SimulationConfig {
    SimulationConfig {
        users: 40,
        ..SimulationConfig::default()
    }
}

#[rstest]
fn default_config_matches_documented_values() {
    let config = SimulationConfig::default();
    assert_eq!(config.users, 300);
    assert_eq!(config.bookings_per_user, 4);
    assert_eq!(config.seed, 42);
    assert_eq!(config.lookback_days, 180);
}

#[rstest]
fn same_seed_reproduces_dataset(
    stations: Vec<Station>,
    config: SimulationConfig,
    reference_time: NaiveDateTime,
) {
    let first = simulate_dataset(stations.clone(), &config, reference_time).expect("simulated");
    let second = simulate_dataset(stations, &config, reference_time).expect("simulated");
    assert_eq!(first, second);
}

#[rstest]
fn bookings_respect_their_invariants(
    stations: Vec<Station>,
    config: SimulationConfig,
    reference_time: NaiveDateTime,
) {
    let dataset = simulate_dataset(stations, &config, reference_time).expect("simulated");
    assert_eq!(dataset.users.len(), config.users);
    assert!(!dataset.bookings.is_empty());

    let user_ids: HashSet<u64> = dataset.users.iter().map(|u| u.id).collect();
    let earliest = reference_time - chrono::Duration::days(i64::from(config.lookback_days));
    let latest = reference_time - chrono::Duration::days(1);
    for booking in &dataset.bookings {
        assert!(user_ids.contains(&booking.user_id));
        let site = dataset
            .stations
            .iter()
            .find(|s| s.station.id == booking.station_id)
            .expect("booked station exists");
        assert!(booking.available_slots_at_booking <= site.station.total_connections);
        assert_eq!(booking.booking_completed, booking.available_slots_at_booking > 0);
        if !booking.booking_completed {
            assert_eq!(booking.wait_time_minutes, 0);
        }
        assert!((1.0..=5.0).contains(&booking.user_rating));
        assert!(booking.distance_km < config.booking_radius_km);
        assert!(booking.booked_at > earliest && booking.booked_at <= latest);
        assert!(booking.booking_id.starts_with(&format!("{}_", booking.user_id)));
    }
}

#[rstest]
fn every_station_gets_conditions(
    stations: Vec<Station>,
    config: SimulationConfig,
    reference_time: NaiveDateTime,
) {
    let dataset = simulate_dataset(stations.clone(), &config, reference_time).expect("simulated");
    let simulated: Vec<&Station> = dataset.stations.iter().map(|s| &s.station).collect();
    assert_eq!(simulated, stations.iter().collect::<Vec<_>>());
}

#[rstest]
fn empty_station_set_is_rejected(config: SimulationConfig, reference_time: NaiveDateTime) {
    let err = simulate_dataset(Vec::new(), &config, reference_time).expect_err("no stations");
    assert!(matches!(err, SimulationError::NoStations));
}

#[rstest]
fn menu_samples_only_listed_values() {
    let menu = Menu::new("test", &[(1_u8, 0.0), (2, 1.0)]).expect("valid weights");
    let mut rng = seeded_rng(5);
    for _ in 0..50 {
        assert_eq!(menu.sample(&mut rng), Some(2));
    }
}

#[rstest]
fn menu_rejects_all_zero_weights() {
    let err = Menu::new("broken", &[(1_u8, 0.0)]).expect_err("zero weights");
    assert!(matches!(err, SimulationError::Weights { menu: "broken", .. }));
}
