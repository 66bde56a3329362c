//! Error type emitted by the Chargewise CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chargewise_data::{JoinError, SimulationError};
use chargewise_scorer::{ArtifactError, ServingError, TrainingError};
use thiserror::Error;

/// Errors emitted by the Chargewise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// An option holds a value the command cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Flag name.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
    /// The directory of a referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
    },
    /// A referenced input path is missing from its directory or is not a
    /// regular file.
    #[error("{field} path {path:?} is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading an input file failed.
    #[error("failed to read {path:?}: {source}")]
    ReadInput {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An input file is not valid JSON of the expected shape.
    #[error("failed to parse {path:?}: {source}")]
    ParseInput {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing an output file failed.
    #[error("failed to write {path:?}: {source}")]
    WriteOutput {
        /// File being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the request from stdin failed.
    #[error("failed to read request: {0}")]
    ReadRequest(#[source] std::io::Error),
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    WriteStdout(#[source] std::io::Error),
    /// Encoding a report failed.
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
    /// The snapshot held no usable station.
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    /// No booking joined to a user and a station.
    #[error(transparent)]
    Join(#[from] JoinError),
    /// Fitting a model failed.
    #[error(transparent)]
    Training(#[from] TrainingError),
    /// Loading or saving the artefact failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// The recommendation request was rejected.
    #[error(transparent)]
    Serving(#[from] ServingError),
}
