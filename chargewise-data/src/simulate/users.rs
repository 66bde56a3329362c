//! Synthetic EV drivers spread across cities in proportion to station
//! counts.

use std::collections::BTreeMap;

use chargewise_core::{ChargingFrequency, PreferredSpeed, Station, User};
use geo::Point;
use rand::Rng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand_distr::Normal;

use super::{Menu, SimulationError};

const EV_MODELS: [(&str, f64); 4] = [
    ("Tata Nexon EV", 0.40),
    ("MG ZS EV", 0.25),
    ("Hyundai Kona", 0.20),
    ("Mahindra eXUV300", 0.15),
];
const BATTERY_KWH: [(u32, f64); 5] = [(25, 0.20), (35, 0.30), (44, 0.30), (50, 0.15), (72, 0.05)];
const PRICE_SENSITIVE: [(bool, f64); 2] = [(false, 0.65), (true, 0.35)];
const SPEEDS: [(PreferredSpeed, f64); 3] = [
    (PreferredSpeed::Any, 0.5),
    (PreferredSpeed::Fast, 0.3),
    (PreferredSpeed::Superfast, 0.2),
];
const FREQUENCIES: [(ChargingFrequency, f64); 3] = [
    (ChargingFrequency::Daily, 0.15),
    (ChargingFrequency::Weekly, 0.60),
    (ChargingFrequency::Occasional, 0.25),
];

/// Standard deviation of the home-location jitter, in degrees per axis.
const HOME_JITTER_DEG: f64 = 0.05;

struct Menus {
    models: Menu<&'static str>,
    batteries: Menu<u32>,
    price_sensitive: Menu<bool>,
    speeds: Menu<PreferredSpeed>,
    frequencies: Menu<ChargingFrequency>,
}

impl Menus {
    fn new() -> Result<Self, SimulationError> {
        Ok(Self {
            models: Menu::new("ev model", &EV_MODELS)?,
            batteries: Menu::new("battery capacity", &BATTERY_KWH)?,
            price_sensitive: Menu::new("price sensitivity", &PRICE_SENSITIVE)?,
            speeds: Menu::new("charger speed", &SPEEDS)?,
            frequencies: Menu::new("charging frequency", &FREQUENCIES)?,
        })
    }
}

/// Station count and mean position of one city.
#[derive(Debug, Clone, Copy)]
struct CityCentre<'a> {
    name: &'a str,
    stations: usize,
    centre: Point<f64>,
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "city centres are coordinate means over bounded station counts"
)]
fn city_centres(stations: &[Station]) -> Vec<CityCentre<'_>> {
    let mut sums: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for station in stations {
        let entry = sums.entry(station.city.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += station.latitude();
        entry.2 += station.longitude();
    }
    sums.into_iter()
        .map(|(name, (count, lat_sum, lng_sum))| {
            let n = count as f64;
            CityCentre {
                name,
                stations: count,
                centre: Point::new(lng_sum / n, lat_sum / n),
            }
        })
        .collect()
}

/// Generate `count` users numbered from 1.
///
/// Each user's city is drawn with probability proportional to its station
/// count; cities are ordered by name so the draw depends only on the
/// station set and the generator state. The home position is the city's
/// mean station position plus Gaussian jitter on each axis.
///
/// # Errors
/// Returns [`SimulationError::NoStations`] for an empty station set.
#[expect(
    clippy::float_arithmetic,
    reason = "home positions add jitter to city centres"
)]
pub fn generate_users<R: Rng + ?Sized>(
    stations: &[Station],
    count: usize,
    rng: &mut R,
) -> Result<Vec<User>, SimulationError> {
    let cities = city_centres(stations);
    let city_index = WeightedIndex::new(cities.iter().map(|c| c.stations)).map_err(|source| {
        match source {
            WeightedError::NoItem => SimulationError::NoStations,
            other => SimulationError::Weights {
                menu: "city",
                source: other,
            },
        }
    })?;
    let jitter = Normal::new(0.0, HOME_JITTER_DEG)?;
    let menus = Menus::new()?;

    let mut users = Vec::with_capacity(count);
    for id in (1..).take(count) {
        let Some(city) = cities.get(city_index.sample(rng)) else {
            continue;
        };
        let home_lat = city.centre.y() + jitter.sample(rng);
        let home_lng = city.centre.x() + jitter.sample(rng);
        users.push(User {
            id,
            base_city: city.name.to_owned(),
            home: Point::new(home_lng, home_lat),
            ev_model: menus.models.sample(rng).unwrap_or("Tata Nexon EV").to_owned(),
            battery_capacity_kwh: menus.batteries.sample(rng).unwrap_or(44),
            is_price_sensitive: menus.price_sensitive.sample(rng).unwrap_or(false),
            preferred_charger_speed: menus.speeds.sample(rng).unwrap_or(PreferredSpeed::Any),
            charging_frequency: menus
                .frequencies
                .sample(rng)
                .unwrap_or(ChargingFrequency::Weekly),
        });
    }
    Ok(users)
}
