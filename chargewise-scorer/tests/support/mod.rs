//! Fixtures shared by the scorer integration tests.

use chargewise_core::test_support::station_in_city;
use chargewise_core::{ChargerCategory, Station};
use chargewise_data::{SimulatedDataset, SimulationConfig, simulate_dataset};
use chargewise_scorer::{ForestParams, TrainingConfig};
use chrono::{NaiveDate, NaiveDateTime};
use geo::Point;

/// Fixed clock for simulations and training stamps.
pub fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_else(|| panic!("valid reference time"))
}

fn rated(station: Station, max_power_kw: f64) -> Station {
    Station {
        max_power_kw,
        charger_category: ChargerCategory::from_power_kw(max_power_kw),
        ..station
    }
}

/// A small seeded dataset around central Bangalore covering every charger
/// category.
pub fn simulated_dataset() -> SimulatedDataset {
    let stations = vec![
        rated(
            station_in_city(1, "Bangalore", Point::new(77.59, 12.97), "Tata Power", 3),
            60.0,
        ),
        rated(
            station_in_city(2, "Bangalore", Point::new(77.62, 12.93), "Statiq", 1),
            7.4,
        ),
        station_in_city(3, "Bangalore", Point::new(77.55, 13.01), "Ather Grid", 2),
        rated(
            station_in_city(4, "Bangalore", Point::new(77.64, 12.99), "Zeon", 4),
            120.0,
        ),
        rated(
            station_in_city(5, "Bangalore", Point::new(77.57, 12.95), "BPCL", 2),
            3.3,
        ),
    ];
    let config = SimulationConfig {
        users: 40,
        bookings_per_user: 3,
        ..SimulationConfig::default()
    };
    simulate_dataset(stations, &config, reference_time())
        .unwrap_or_else(|err| panic!("simulation succeeds: {err}"))
}

/// Training settings small enough for tests.
pub fn quick_training() -> TrainingConfig {
    TrainingConfig {
        forest: ForestParams {
            trees: 12,
            max_depth: 6,
            ..ForestParams::default()
        },
        ..TrainingConfig::default()
    }
}
