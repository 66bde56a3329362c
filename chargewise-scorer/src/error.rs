//! Error types raised while deriving features, training, persisting and
//! serving models.

use camino::Utf8PathBuf;
use chargewise_data::JoinError;
use thiserror::Error;

/// Errors raised by [`CategoryEncoder`](crate::CategoryEncoder).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncoderError {
    /// No category was seen while fitting.
    #[error("cannot fit a category encoder without categories")]
    Empty,
    /// The category was not seen during training.
    #[error("charger category '{0}' was not seen during training")]
    Unseen(String),
    /// The station's category label could not be recognised at all.
    #[error("charger category is missing or unrecognised")]
    Unrecognised,
}

/// Per-station failures while building or scaling a feature vector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    /// Category encoding failed.
    #[error(transparent)]
    Encoder(#[from] EncoderError),
    /// A vector does not have the width the fitted statistics expect.
    #[error("feature vector has {found} values, expected {expected}")]
    Width {
        /// Width of the fitted schema.
        expected: usize,
        /// Width of the offending vector.
        found: usize,
    },
    /// A derived value is NaN or infinite.
    #[error("feature '{feature}' is not finite")]
    NonFinite {
        /// Feature name.
        feature: String,
    },
}

/// Errors raised while fitting or evaluating a model.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Too few rows to produce both a training and a test partition.
    #[error("need at least two training rows, got {rows}")]
    TooFewRows {
        /// Rows available.
        rows: usize,
    },
    /// The held-out fraction is outside `(0, 1)`.
    #[error("test fraction must be within (0, 1), got {0}")]
    InvalidTestFraction(f64),
    /// Forest hyper-parameters are unusable.
    #[error("invalid forest parameters: {0}")]
    InvalidForest(&'static str),
    /// Rows of the design matrix have different widths.
    #[error("design matrix rows must share one width")]
    RaggedMatrix,
    /// A matrix could not be assembled from its parts.
    #[error("design matrix has an inconsistent shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    /// Feature derivation failed for a training row.
    #[error(transparent)]
    Features(#[from] FeatureError),
    /// Category encoding failed.
    #[error(transparent)]
    Encoder(#[from] EncoderError),
    /// The fitted bundle failed validation.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Errors raised while persisting or loading a model artefact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artefact file could not be read.
    #[error("failed to read model artefact at {path}")]
    Read {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The artefact bytes could not be decoded.
    #[error("failed to decode model artefact")]
    Decode(#[source] bincode::Error),
    /// The artefact could not be encoded.
    #[error("failed to encode model artefact")]
    Encode(#[source] bincode::Error),
    /// The artefact file could not be written.
    #[error("failed to write model artefact at {path}")]
    Write {
        /// Artefact path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The artefact decoded but its parts cannot be used together.
    #[error("model artefact is incompatible: {0}")]
    Incompatible(String),
}

impl ArtifactError {
    /// Whether callers may fall back to rule-based scoring.
    ///
    /// Missing, unreadable and undecodable files are recoverable. A bundle
    /// that decodes but is internally inconsistent is not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Incompatible(_) | Self::Encode(_) | Self::Write { .. })
    }
}

/// Request-level failures at the serving boundary.
#[derive(Debug, Error)]
pub enum ServingError {
    /// The request body is not valid JSON of the expected shape.
    #[error("request is not valid JSON")]
    MalformedJson(#[source] serde_json::Error),
    /// The response could not be encoded.
    #[error("failed to encode response")]
    Encode(#[source] serde_json::Error),
}

/// Errors raised by [`RecommenderService`](crate::RecommenderService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No model has been trained or loaded.
    #[error("model not trained")]
    NotTrained,
    /// Bookings could not be joined into training rows.
    #[error(transparent)]
    Join(#[from] JoinError),
    /// Training failed.
    #[error(transparent)]
    Training(#[from] TrainingError),
    /// Loading or saving the artefact failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// The prediction request could not be featurised.
    #[error(transparent)]
    Features(#[from] FeatureError),
}
