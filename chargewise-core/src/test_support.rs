//! Test-only builders for stations and users used by unit and behaviour
//! tests across the workspace.

use geo::Point;

use crate::{ChargerCategory, ChargingFrequency, PreferredSpeed, Station, User};

/// Build an operational station with two connectors at the given position.
#[must_use]
pub fn station_at(id: u64, lat: f64, lng: f64, max_power_kw: f64) -> Station {
    Station {
        id,
        name: format!("Station {id}"),
        address: String::new(),
        city: "Testville".to_owned(),
        state: String::new(),
        country: "India".to_owned(),
        location: Point::new(lng, lat),
        distance_from_reference_km: 0.0,
        total_connections: 2,
        max_power_kw,
        charger_category: ChargerCategory::from_power_kw(max_power_kw),
        connection_types: vec!["CCS (Type 2)".to_owned()],
        operator: "Unknown".to_owned(),
        is_operational: true,
        status: "Operational".to_owned(),
        last_updated: String::new(),
        data_provider: "OpenChargeMap".to_owned(),
    }
}

/// Build a station in `city` with the given operator and connector count.
#[must_use]
pub fn station_in_city(
    id: u64,
    city: &str,
    location: Point<f64>,
    operator: &str,
    total_connections: u32,
) -> Station {
    Station {
        city: city.to_owned(),
        operator: operator.to_owned(),
        total_connections,
        ..station_at(id, location.y(), location.x(), 22.0)
    }
}

/// Build a non price-sensitive user with a 44 kWh battery and no speed
/// preference.
#[must_use]
pub fn user_at(id: u64, lat: f64, lng: f64) -> User {
    User {
        id,
        base_city: "Testville".to_owned(),
        home: Point::new(lng, lat),
        ev_model: "Tata Nexon EV".to_owned(),
        battery_capacity_kwh: 44,
        is_price_sensitive: false,
        preferred_charger_speed: PreferredSpeed::Any,
        charging_frequency: ChargingFrequency::Weekly,
    }
}
