//! The persisted model bundle.
//!
//! A [`ModelArtifact`] carries everything inference needs to reproduce the
//! training-time pipeline: the feature schema, the fitted category encoder,
//! the fitted scaler and the regressor. Artefacts are written with
//! `bincode` and replaced atomically on disk; a loaded artefact is never
//! mutated.

use bincode::Options;
use camino::Utf8Path;
use chargewise_core::{StationFeatures, StationScorer, UserPreferences, round_dp};
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    ArtifactError, CategoryEncoder, FeatureBuilder, FeatureError, FeatureSchema, FittedRegressor,
    RegressorKind, StandardScaler,
};

/// Version written into new artefacts. Other versions are rejected.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
/// Lowest rating a model may return.
pub const MIN_PREDICTED_RATING: f64 = 1.0;
/// Highest rating a model may return.
pub const MAX_PREDICTED_RATING: f64 = 5.0;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// A trained regressor with its preprocessing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    version: u32,
    kind: RegressorKind,
    trained_at: NaiveDateTime,
    schema: FeatureSchema,
    encoder: CategoryEncoder,
    scaler: StandardScaler,
    regressor: FittedRegressor,
}

impl ModelArtifact {
    /// Bundle fitted parts and check they agree.
    ///
    /// # Errors
    /// [`ArtifactError::Incompatible`] when widths disagree or the schema
    /// has no computable feature.
    pub fn new(
        trained_at: NaiveDateTime,
        schema: FeatureSchema,
        encoder: CategoryEncoder,
        scaler: StandardScaler,
        regressor: FittedRegressor,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            version: ARTIFACT_FORMAT_VERSION,
            kind: regressor.kind(),
            trained_at,
            schema,
            encoder,
            scaler,
            regressor,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check that the parts can be used together.
    ///
    /// # Errors
    /// [`ArtifactError::Incompatible`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "format version {} is not supported (expected {ARTIFACT_FORMAT_VERSION})",
                self.version
            )));
        }
        if self.schema.known_count() == 0 {
            return Err(ArtifactError::Incompatible(
                "feature list contains no recognised feature".to_owned(),
            ));
        }
        let width = self.schema.len();
        if self.scaler.width() != width || self.regressor.width() != width {
            return Err(ArtifactError::Incompatible(format!(
                "schema has {width} features but scaler expects {} and regressor {}",
                self.scaler.width(),
                self.regressor.width()
            )));
        }
        if self.kind != self.regressor.kind() {
            return Err(ArtifactError::Incompatible(format!(
                "labelled {} but holds a {} regressor",
                self.kind,
                self.regressor.kind()
            )));
        }
        if !self.regressor.is_well_formed() {
            return Err(ArtifactError::Incompatible(
                "regressor parameters are inconsistent".to_owned(),
            ));
        }
        Ok(())
    }

    /// Regressor kind.
    #[must_use]
    pub const fn kind(&self) -> RegressorKind {
        self.kind
    }

    /// When the model was trained.
    #[must_use]
    pub const fn trained_at(&self) -> NaiveDateTime {
        self.trained_at
    }

    /// Stored feature schema.
    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Fitted category encoder.
    #[must_use]
    pub const fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    /// Fitted scaler.
    #[must_use]
    pub const fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Fitted regressor.
    #[must_use]
    pub const fn regressor(&self) -> &FittedRegressor {
        &self.regressor
    }

    /// Builder bound to this artefact's schema and encoder.
    #[must_use]
    pub const fn feature_builder(&self) -> FeatureBuilder<'_> {
        FeatureBuilder::new(&self.schema, &self.encoder)
    }

    /// Predict the rating for one station, optionally at a given time.
    ///
    /// The raw regressor output is clamped to the rating range and rounded
    /// to two decimals.
    ///
    /// # Errors
    /// [`FeatureError`] when the station cannot be featurised.
    pub fn predict_at(
        &self,
        station: &StationFeatures,
        user: &UserPreferences,
        booked_at: Option<NaiveDateTime>,
    ) -> Result<f64, FeatureError> {
        let raw = self.feature_builder().build(station, user, booked_at)?;
        let scaled = self.scaler.transform(&raw)?;
        let rating = self.regressor.predict(&scaled)?;
        Ok(round_dp(
            rating.clamp(MIN_PREDICTED_RATING, MAX_PREDICTED_RATING),
            2,
        ))
    }

    /// Encode to bytes.
    ///
    /// # Errors
    /// [`ArtifactError::Encode`] when serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        bincode_options()
            .serialize(self)
            .map_err(ArtifactError::Encode)
    }

    /// Decode and validate bytes.
    ///
    /// # Errors
    /// [`ArtifactError::Decode`] for undecodable input and
    /// [`ArtifactError::Incompatible`] for a bundle that fails validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: Self = bincode_options()
            .deserialize(bytes)
            .map_err(ArtifactError::Decode)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write the artefact atomically, creating parent directories.
    ///
    /// # Errors
    /// [`ArtifactError::Encode`] or [`ArtifactError::Write`].
    pub fn save(&self, path: &Utf8Path) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        chargewise_fs::write_atomic(path, &bytes).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved {} model to {path} ({} bytes)", self.kind, bytes.len());
        Ok(())
    }

    /// Read and validate an artefact.
    ///
    /// # Errors
    /// [`ArtifactError::Read`], [`ArtifactError::Decode`] or
    /// [`ArtifactError::Incompatible`].
    pub fn load(path: &Utf8Path) -> Result<Self, ArtifactError> {
        let bytes = chargewise_fs::read_bytes(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_bytes(&bytes)?;
        info!(
            "loaded {} model trained at {} from {path}",
            artifact.kind, artifact.trained_at
        );
        Ok(artifact)
    }
}

impl StationScorer for ModelArtifact {
    type Error = FeatureError;

    fn score(&self, station: &StationFeatures, user: &UserPreferences) -> Result<f64, FeatureError> {
        self.predict_at(station, user, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistanceBuckets, FeatureSlot, ForestParams};
    use chargewise_core::ChargerCategory;
    use chrono::NaiveDate;
    use ndarray::array;
    use rstest::{fixture, rstest};

    #[fixture]
    fn trained_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp")
    }

    fn tiny_artifact(trained_at: NaiveDateTime) -> ModelArtifact {
        let schema = FeatureSchema::new(
            vec![
                FeatureSlot::from("distance_km".to_owned()),
                FeatureSlot::from("available_slots".to_owned()),
            ],
            DistanceBuckets::Quartile,
        );
        let rows = array![[1.0, 2.0], [5.0, 1.0], [20.0, 0.0], [40.0, 0.0]];
        let scaler = StandardScaler::fit(rows.view()).expect("scaler");
        let scaled = scaler.transform_matrix(rows.view()).expect("rows");
        let regressor = FittedRegressor::fit(
            RegressorKind::Linear,
            scaled.view(),
            array![4.8, 4.0, 2.5, 1.2].view(),
            &ForestParams::default(),
            0,
        )
        .expect("fit");
        let encoder = CategoryEncoder::fit([ChargerCategory::Fast]).expect("encoder");
        ModelArtifact::new(trained_at, schema, encoder, scaler, regressor).expect("valid")
    }

    fn candidate(distance_km: f64, slots: u32) -> StationFeatures {
        StationFeatures {
            distance_km,
            available_slots: Some(slots),
            total_connections: Some(2),
            max_power_kw: Some(22.0),
            price_per_kwh: Some(9.0),
            reliability_score: None,
            charger_category: Some(ChargerCategory::Fast),
            is_operational: true,
        }
    }

    #[rstest]
    fn predictions_are_clamped_and_rounded(trained_at: NaiveDateTime) {
        let artifact = tiny_artifact(trained_at);
        let user = UserPreferences::new(40.0, false);
        let near = artifact.score(&candidate(0.1, 2), &user).expect("score");
        let far = artifact.score(&candidate(500.0, 0), &user).expect("score");
        assert!((MIN_PREDICTED_RATING..=MAX_PREDICTED_RATING).contains(&near));
        assert_eq!(far, MIN_PREDICTED_RATING);
        assert_eq!(round_dp(near, 2), near);
    }

    #[rstest]
    fn bytes_round_trip(trained_at: NaiveDateTime) {
        let artifact = tiny_artifact(trained_at);
        let bytes = artifact.to_bytes().expect("encode");
        assert_eq!(ModelArtifact::from_bytes(&bytes).expect("decode"), artifact);
    }

    #[rstest]
    fn garbage_is_a_recoverable_decode_error() {
        let err = ModelArtifact::from_bytes(b"not a model").expect_err("garbage");
        assert!(matches!(err, ArtifactError::Decode(_)));
        assert!(err.is_recoverable());
    }

    #[rstest]
    fn width_disagreement_is_fatal(trained_at: NaiveDateTime) {
        let mut artifact = tiny_artifact(trained_at);
        artifact.schema = FeatureSchema::training();
        let err = artifact.validate().expect_err("widths differ");
        assert!(matches!(err, ArtifactError::Incompatible(_)));
        assert!(!err.is_recoverable());
    }

    #[rstest]
    fn future_versions_are_rejected(trained_at: NaiveDateTime) {
        let mut artifact = tiny_artifact(trained_at);
        artifact.version = ARTIFACT_FORMAT_VERSION + 1;
        let bytes = artifact.to_bytes().expect("encode");
        assert!(matches!(
            ModelArtifact::from_bytes(&bytes),
            Err(ArtifactError::Incompatible(_))
        ));
    }

    #[rstest]
    fn schema_without_known_features_is_rejected(trained_at: NaiveDateTime) {
        let mut artifact = tiny_artifact(trained_at);
        artifact.schema = FeatureSchema::new(
            vec![
                FeatureSlot::Unknown("a".to_owned()),
                FeatureSlot::Unknown("b".to_owned()),
            ],
            DistanceBuckets::Quartile,
        );
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::Incompatible(_))
        ));
    }
}
