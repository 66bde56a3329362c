//! Unit tests for directory normalisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn bangalore() -> Point<f64> {
    Point::new(77.5946, 12.9716)
}

fn record(id: u64, lat: f64, lng: f64, powers: &[f64], operational: bool) -> Value {
    let connections: Vec<Value> = powers
        .iter()
        .map(|kw| json!({ "PowerKW": kw, "ConnectionType": { "Title": "CCS (Type 2)" } }))
        .collect();
    json!({
        "ID": id,
        "AddressInfo": {
            "Title": format!("Station {id}"),
            "AddressLine1": "MG Road",
            "Town": "Bangalore",
            "StateOrProvince": "Karnataka",
            "Country": { "Title": "India" },
            "Latitude": lat,
            "Longitude": lng
        },
        "Connections": connections,
        "OperatorInfo": { "Title": "Tata Power" },
        "StatusType": { "IsOperational": operational, "Title": "Operational" },
        "DateLastStatusUpdate": "2024-01-01T00:00:00Z"
    })
}

fn decode(value: &Value) -> RawStation {
    RawStation::deserialize(value).expect("fixture decodes")
}

#[rstest]
#[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
fn record_takes_highest_connector_power(bangalore: Point<f64>) {
    let raw = decode(&record(1, 12.98, 77.60, &[7.4, 60.0, 22.0], true));
    let station = normalise_record(&raw, bangalore).expect("record normalises");
    assert_eq!(station.total_connections, 3);
    assert!((station.max_power_kw - 60.0).abs() < f64::EPSILON);
    assert_eq!(station.charger_category, ChargerCategory::Superfast);
    assert_eq!(station.connection_types, vec!["CCS (Type 2)".to_owned()]);
    assert_eq!(station.operator, "Tata Power");
    assert_eq!(station.data_provider, DEFAULT_PROVIDER);
}

#[rstest]
#[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
#[case(json!([]))]
#[case(json!([{ "PowerKW": null }, { "PowerKW": 0 }]))]
fn missing_power_defaults_to_seven(bangalore: Point<f64>, #[case] connections: Value) {
    let value = json!({
        "ID": 9,
        "AddressInfo": { "Latitude": 12.97, "Longitude": 77.59 },
        "Connections": connections
    });
    let station = normalise_record(&decode(&value), bangalore).expect("record normalises");
    assert!((station.max_power_kw - DEFAULT_POWER_KW).abs() < f64::EPSILON);
    assert_eq!(station.charger_category, ChargerCategory::Slow);
    assert!(station.total_connections >= 1);
    assert_eq!(station.name, "Unknown Station");
    assert_eq!(station.city, UNKNOWN);
    assert!(!station.is_operational);
}

#[rstest]
fn missing_coordinates_are_reported(bangalore: Point<f64>) {
    let value = json!({ "ID": 4, "AddressInfo": { "Latitude": 12.0 } });
    let err = normalise_record(&decode(&value), bangalore).expect_err("no longitude");
    assert!(matches!(err, NormaliseError::MissingCoordinates { id: 4 }));
}

#[rstest]
fn missing_identifier_is_reported(bangalore: Point<f64>) {
    let value = json!({ "AddressInfo": { "Latitude": 12.0, "Longitude": 77.0 } });
    let err = normalise_record(&decode(&value), bangalore).expect_err("no id");
    assert!(matches!(err, NormaliseError::MissingId));
}

#[rstest]
fn out_of_range_coordinates_fail_validation(bangalore: Point<f64>) {
    let raw = decode(&record(5, 95.0, 77.0, &[22.0], true));
    let err = normalise_record(&raw, bangalore).expect_err("latitude out of range");
    assert!(matches!(
        err,
        NormaliseError::Invalid(StationError::InvalidCoordinates { id: 5, .. })
    ));
}

#[rstest]
fn free_text_is_truncated_by_characters(bangalore: Point<f64>) {
    let long_name = "é".repeat(80);
    let value = json!({
        "ID": 6,
        "AddressInfo": { "Title": long_name, "Latitude": 12.97, "Longitude": 77.59 },
        "OperatorInfo": { "Title": "x".repeat(45) }
    });
    let station = normalise_record(&decode(&value), bangalore).expect("record normalises");
    assert_eq!(station.name.chars().count(), MAX_NAME_CHARS);
    assert_eq!(station.operator.chars().count(), MAX_OPERATOR_CHARS);
}

#[rstest]
#[expect(clippy::float_arithmetic, reason = "test compares floating point values")]
fn distance_is_rounded_to_two_decimals(bangalore: Point<f64>) {
    let raw = decode(&record(7, 13.0827, 80.2707, &[22.0], true));
    let station = normalise_record(&raw, bangalore).expect("record normalises");
    let scaled = station.distance_from_reference_km * 100.0;
    assert!((scaled - scaled.round()).abs() < 1e-6);
    assert!((station.distance_from_reference_km - 290.17).abs() < 0.01);
}

#[rstest]
fn batch_deduplicates_and_filters(bangalore: Point<f64>) {
    let records = vec![
        record(1, 12.98, 77.60, &[22.0], true),
        record(1, 12.99, 77.61, &[60.0], true),
        record(2, 12.95, 77.58, &[7.0], false),
        json!({ "ID": "not-a-number" }),
        json!({ "ID": 3 }),
        record(4, 12.93, 77.62, &[50.0], true),
    ];
    let (stations, report) = normalise_batch(&records, bangalore);
    let ids: Vec<u64> = stations.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 4]);
    let first = stations.first().expect("station 1 kept");
    assert_eq!(first.charger_category, ChargerCategory::Fast);
    assert_eq!(
        report,
        NormaliseReport {
            received: 6,
            skipped_invalid: 2,
            duplicates: 1,
            non_operational: 1,
            kept: 2,
        }
    );
}

#[rstest]
fn cities_share_one_deduplication_pass() {
    let batches = vec![
        CityBatch {
            name: "Mumbai".to_owned(),
            latitude: 19.0760,
            longitude: 72.8777,
            records: vec![record(10, 19.07, 72.88, &[22.0], true)],
        },
        CityBatch {
            name: "Pune".to_owned(),
            latitude: 18.5204,
            longitude: 73.8567,
            records: vec![
                record(10, 19.07, 72.88, &[22.0], true),
                record(11, 18.52, 73.85, &[7.0], true),
            ],
        },
    ];
    let (stations, report) = normalise_cities(&batches);
    assert_eq!(stations.len(), 2);
    assert_eq!(report.duplicates, 1);
    let mumbai = stations.first().expect("first station");
    assert!(mumbai.distance_from_reference_km < 1.0);
}
