//! Per-run availability, price, wait and reliability for each station.

use chargewise_core::{ChargerCategory, Station, StationConditions, round_dp};
use rand::Rng;

/// Operators whose stations get the higher reliability band. Matched as
/// case-insensitive substrings.
pub const MAJOR_OPERATORS: [&str; 4] = ["Tata Power", "Ather", "ChargePoint", "BPCL"];

const WAIT_MINUTES: std::ops::Range<u32> = 5..45;
const MAJOR_RELIABILITY: (f64, f64) = (0.85, 0.98);
const OTHER_RELIABILITY: (f64, f64) = (0.65, 0.85);

/// The station attributes the condition simulator reads.
///
/// Serving candidates are not canonical stations, so the simulator works
/// from this narrow view instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteProfile<'a> {
    /// Connector count.
    pub total_connections: u32,
    /// Speed class, `None` when unknown.
    pub charger_category: Option<ChargerCategory>,
    /// Operator name.
    pub operator: &'a str,
}

impl<'a> From<&'a Station> for SiteProfile<'a> {
    fn from(station: &'a Station) -> Self {
        Self {
            total_connections: station.total_connections,
            charger_category: Some(station.charger_category),
            operator: &station.operator,
        }
    }
}

/// Tariff band in currency units per kWh for a speed class.
#[must_use]
pub const fn price_band(category: Option<ChargerCategory>) -> (f64, f64) {
    match category {
        Some(ChargerCategory::Slow) => (6.0, 10.0),
        Some(ChargerCategory::Fast) => (8.0, 13.0),
        Some(ChargerCategory::Superfast) => (10.0, 16.0),
        None => (7.0, 12.0),
    }
}

fn is_major_operator(operator: &str) -> bool {
    let lowered = operator.to_lowercase();
    MAJOR_OPERATORS
        .iter()
        .any(|major| lowered.contains(&major.to_lowercase()))
}

/// Simulate conditions for every site, in input order.
///
/// Draws are made one attribute at a time across all sites: slots first,
/// then prices, waits and finally reliability.
pub fn simulate_conditions<R: Rng + ?Sized>(
    sites: &[SiteProfile<'_>],
    rng: &mut R,
) -> Vec<StationConditions> {
    let slots: Vec<u32> = sites
        .iter()
        .map(|site| rng.gen_range(0..=site.total_connections))
        .collect();
    let prices: Vec<f64> = sites
        .iter()
        .map(|site| {
            let (low, high) = price_band(site.charger_category);
            round_dp(rng.gen_range(low..high), 2)
        })
        .collect();
    let waits: Vec<u32> = sites
        .iter()
        .map(|_| rng.gen_range(WAIT_MINUTES))
        .collect();
    let reliability: Vec<f64> = sites
        .iter()
        .map(|site| {
            let (low, high) = if is_major_operator(site.operator) {
                MAJOR_RELIABILITY
            } else {
                OTHER_RELIABILITY
            };
            round_dp(rng.gen_range(low..=high), 2)
        })
        .collect();

    slots
        .into_iter()
        .zip(prices)
        .zip(waits)
        .zip(reliability)
        .map(
            |(((available_slots, price_per_kwh), avg_wait_minutes), reliability_score)| {
                StationConditions {
                    available_slots,
                    price_per_kwh,
                    avg_wait_minutes,
                    reliability_score,
                }
            },
        )
        .collect()
}
