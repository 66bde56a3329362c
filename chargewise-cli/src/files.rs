//! JSON files and streams shared by the commands.

use std::io::Write;

use camino::Utf8Path;
use chargewise_data::SimulatedDataset;
use serde::{Serialize, de::DeserializeOwned};

use crate::CliError;

/// Stations with their simulated conditions.
pub(crate) const STATIONS_FILE: &str = "stations.json";
/// Synthetic users.
pub(crate) const USERS_FILE: &str = "users.json";
/// Synthetic bookings.
pub(crate) const BOOKINGS_FILE: &str = "bookings.json";

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match chargewise_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let bytes = chargewise_fs::read_bytes(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Utf8Path, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_vec_pretty(value).map_err(CliError::Encode)?;
    chargewise_fs::write_atomic(path, &payload).map_err(|source| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the three tables written by `simulate`.
pub(crate) fn load_dataset(dir: &Utf8Path) -> Result<SimulatedDataset, CliError> {
    Ok(SimulatedDataset {
        stations: read_json(&dir.join(STATIONS_FILE))?,
        users: read_json(&dir.join(USERS_FILE))?,
        bookings: read_json(&dir.join(BOOKINGS_FILE))?,
    })
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn emit<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::Encode)?;
    write_line(writer, &payload)
}

pub(crate) fn write_line(writer: &mut dyn Write, payload: &str) -> Result<(), CliError> {
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteStdout)?;
    writer.write_all(b"\n").map_err(CliError::WriteStdout)?;
    writer.flush().map_err(CliError::WriteStdout)
}
