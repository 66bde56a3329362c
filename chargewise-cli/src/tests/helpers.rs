//! Test helpers for building snapshots and workspaces on disk.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary directory addressed through UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    chargewise_fs::write_atomic(path, contents).expect("write file");
}

pub(super) fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|day| day.and_hms_opt(12, 0, 0))
        .expect("valid reference time")
}

fn record(id: u64, lat: f64, lng: f64, power_kw: f64, operator: &str) -> Value {
    json!({
        "ID": id,
        "AddressInfo": {
            "Title": format!("Site {id}"),
            "Town": "Bangalore",
            "Latitude": lat,
            "Longitude": lng
        },
        "Connections": [{ "PowerKW": power_kw }, { "PowerKW": power_kw }],
        "OperatorInfo": { "Title": operator },
        "StatusType": { "IsOperational": true, "Title": "Operational" }
    })
}

/// One Bangalore batch with two stations per charger category, a record
/// without coordinates and a duplicate.
pub(super) fn snapshot() -> Value {
    json!([{
        "name": "Bangalore",
        "latitude": 12.9716,
        "longitude": 77.5946,
        "records": [
            record(1, 12.9716, 77.5946, 60.0, "Tata Power"),
            record(2, 12.9352, 77.6245, 7.4, "Statiq"),
            record(3, 12.9784, 77.6408, 22.0, "Ather Grid"),
            record(4, 13.0358, 77.5970, 120.0, "Zeon"),
            record(5, 12.9141, 77.6101, 3.3, "BPCL"),
            record(6, 12.9592, 77.6974, 25.0, "ChargeZone"),
            { "ID": 7, "AddressInfo": { "Title": "Nowhere" } },
            record(1, 12.9716, 77.5946, 60.0, "Tata Power")
        ]
    }])
}

pub(super) fn write_snapshot(workspace: &Workspace) -> Utf8PathBuf {
    let path = workspace.path("snapshot.json");
    let payload = serde_json::to_vec(&snapshot()).expect("encode snapshot");
    write_utf8(&path, &payload);
    path
}

pub(super) fn parse_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout carries JSON")
}
