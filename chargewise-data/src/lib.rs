//! Station ingestion and synthetic interaction data for Chargewise.
//!
//! Responsibilities:
//! - Normalise raw public charging-directory records into canonical
//!   [`Station`](chargewise_core::Station) values.
//! - Simulate per-run station conditions, users and bookings from a seed.
//! - Join bookings back to users and stations to produce training rows.
//!
//! Boundaries:
//! - No network access. Callers hand over directory records they fetched.
//! - Feature engineering and model fitting live in `chargewise-scorer`.
//!
//! Invariants:
//! - Every random draw goes through an explicitly seeded generator, so the
//!   same inputs and seed reproduce the same dataset.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod dataset;
pub mod directory;
pub mod simulate;

pub use dataset::{DatasetSummary, JoinError, JoinReport, TrainingExample, TrainingSet};
pub use directory::{
    CityBatch, NormaliseError, NormaliseReport, RawStation, normalise_batch, normalise_cities,
    normalise_record,
};
pub use simulate::{
    SimulatedDataset, SimulatedStation, SimulationConfig, SimulationError, SiteProfile,
    generate_bookings, generate_users, seeded_rng, simulate_conditions, simulate_dataset,
};
