//! Normalise public charging-directory records into canonical stations.
//!
//! Records arrive as loosely typed JSON. Each one is decoded and
//! normalised on its own: a record that fails is logged and counted, and
//! the rest of the batch carries on. The surviving stations are then
//! deduplicated by identifier (first occurrence wins) and filtered to the
//! operational ones.

use std::collections::HashSet;

use chargewise_core::{ChargerCategory, Station, StationError, haversine_km, round_dp};
use geo::Point;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

mod raw;

pub use raw::{RawAddress, RawConnection, RawStation, RawStatus, RawTitled};

/// Longest station name kept, in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Longest address kept, in characters.
pub const MAX_ADDRESS_CHARS: usize = 100;
/// Longest operator name kept, in characters.
pub const MAX_OPERATOR_CHARS: usize = 30;
/// Power assumed when no connector reports a usable rating.
pub const DEFAULT_POWER_KW: f64 = 7.0;

const UNKNOWN: &str = "Unknown";
const DEFAULT_PROVIDER: &str = "OpenChargeMap";

/// Reasons a single directory record is skipped.
#[derive(Debug, Error)]
pub enum NormaliseError {
    /// The record could not be decoded at all.
    #[error("record {index} is malformed")]
    Malformed {
        /// Position of the record in its batch.
        index: usize,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The record carries no identifier.
    #[error("record has no station identifier")]
    MissingId,
    /// Latitude or longitude is absent.
    #[error("station {id} has no coordinates")]
    MissingCoordinates {
        /// Station identifier.
        id: u64,
    },
    /// The canonical station breaks a structural invariant.
    #[error(transparent)]
    Invalid(#[from] StationError),
}

/// Counters describing one normalisation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormaliseReport {
    /// Records handed to the normaliser.
    pub received: usize,
    /// Records skipped because they could not be normalised.
    pub skipped_invalid: usize,
    /// Records dropped because an earlier record had the same identifier.
    pub duplicates: usize,
    /// Records dropped because the station is not operational.
    pub non_operational: usize,
    /// Stations returned.
    pub kept: usize,
}

/// Raw directory records fetched around one city centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBatch {
    /// City name, used for logging only.
    pub name: String,
    /// Latitude of the search centre.
    pub latitude: f64,
    /// Longitude of the search centre.
    pub longitude: f64,
    /// Directory records as returned by the directory.
    pub records: Vec<Value>,
}

impl CityBatch {
    /// Search centre as a point.
    #[must_use]
    pub fn centre(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Normalise one decoded directory record.
///
/// `reference` is the search centre the record was fetched around; the
/// station keeps its distance from it.
///
/// # Errors
/// Returns [`NormaliseError`] when the record has no identifier, no
/// coordinates, or produces a station that fails validation.
pub fn normalise_record(raw: &RawStation, reference: Point<f64>) -> Result<Station, NormaliseError> {
    let id = raw.id.ok_or(NormaliseError::MissingId)?;
    let address = raw.address_info.clone().unwrap_or_default();
    let (Some(lat), Some(lng)) = (address.latitude, address.longitude) else {
        return Err(NormaliseError::MissingCoordinates { id });
    };
    let location = Point::new(lng, lat);

    let connections = raw.connections.as_deref().unwrap_or_default();
    let max_power_kw = max_power(connections);
    let status = raw.status_type.as_ref();

    let station = Station {
        id,
        name: truncate_chars(
            address.title.as_deref().unwrap_or("Unknown Station"),
            MAX_NAME_CHARS,
        ),
        address: truncate_chars(
            address.address_line1.as_deref().unwrap_or_default(),
            MAX_ADDRESS_CHARS,
        ),
        city: address.town.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
        state: address.state_or_province.clone().unwrap_or_default(),
        country: RawTitled::title(address.country.as_ref())
            .unwrap_or_default()
            .to_owned(),
        location,
        distance_from_reference_km: round_dp(haversine_km(reference, location), 2),
        total_connections: u32::try_from(connections.len())
            .unwrap_or(u32::MAX)
            .max(1),
        max_power_kw,
        charger_category: ChargerCategory::from_power_kw(max_power_kw),
        connection_types: connection_types(connections),
        operator: truncate_chars(
            RawTitled::title(raw.operator_info.as_ref()).unwrap_or(UNKNOWN),
            MAX_OPERATOR_CHARS,
        ),
        is_operational: status.and_then(|s| s.is_operational).unwrap_or(false),
        status: status
            .and_then(|s| s.title.clone())
            .unwrap_or_else(|| UNKNOWN.to_owned()),
        last_updated: raw.date_last_status_update.clone().unwrap_or_default(),
        data_provider: RawTitled::title(raw.data_provider.as_ref())
            .unwrap_or(DEFAULT_PROVIDER)
            .to_owned(),
    };
    station.validate()?;
    Ok(station)
}

/// Normalise a batch of records fetched around `reference`.
///
/// Returns the deduplicated operational stations together with counters
/// describing what was dropped and why.
#[must_use]
pub fn normalise_batch(records: &[Value], reference: Point<f64>) -> (Vec<Station>, NormaliseReport) {
    let mut report = NormaliseReport::default();
    let candidates = decode_batch(records, reference, &mut report);
    let stations = retain_unique_operational(candidates, &mut report);
    log_report(&report);
    (stations, report)
}

/// Normalise several city batches, each against its own centre.
///
/// Batches are concatenated in order before deduplication, so a station
/// listed by two neighbouring cities keeps the first city's distance.
#[must_use]
pub fn normalise_cities(batches: &[CityBatch]) -> (Vec<Station>, NormaliseReport) {
    let mut report = NormaliseReport::default();
    let mut candidates = Vec::new();
    for batch in batches {
        debug!(
            "normalising {} records for {}",
            batch.records.len(),
            batch.name
        );
        candidates.extend(decode_batch(&batch.records, batch.centre(), &mut report));
    }
    let stations = retain_unique_operational(candidates, &mut report);
    log_report(&report);
    (stations, report)
}

fn decode_batch(
    records: &[Value],
    reference: Point<f64>,
    report: &mut NormaliseReport,
) -> Vec<Station> {
    report.received += records.len();
    records
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let outcome = RawStation::deserialize(value)
                .map_err(|source| NormaliseError::Malformed { index, source })
                .and_then(|raw| normalise_record(&raw, reference));
            match outcome {
                Ok(station) => Some(station),
                Err(err) => {
                    warn!("skipping directory record: {err}");
                    report.skipped_invalid += 1;
                    None
                }
            }
        })
        .collect()
}

fn retain_unique_operational(
    candidates: Vec<Station>,
    report: &mut NormaliseReport,
) -> Vec<Station> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());
    for station in candidates {
        if !seen.insert(station.id) {
            report.duplicates += 1;
            continue;
        }
        if !station.is_operational {
            report.non_operational += 1;
            continue;
        }
        kept.push(station);
    }
    report.kept = kept.len();
    kept
}

fn log_report(report: &NormaliseReport) {
    info!(
        "normalised {} of {} directory records ({} invalid, {} duplicate, {} not operational)",
        report.kept,
        report.received,
        report.skipped_invalid,
        report.duplicates,
        report.non_operational
    );
}

fn max_power(connections: &[RawConnection]) -> f64 {
    connections
        .iter()
        .filter_map(|c| c.power_kw)
        .filter(|kw| kw.is_finite() && *kw > 0.0)
        .reduce(f64::max)
        .unwrap_or(DEFAULT_POWER_KW)
}

fn connection_types(connections: &[RawConnection]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for connection in connections {
        let title = RawTitled::title(connection.connection_type.as_ref()).unwrap_or(UNKNOWN);
        if !types.iter().any(|t| t == title) {
            types.push(title.to_owned());
        }
    }
    types
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests;
