//! Core domain types for the Chargewise recommender.
//!
//! The crate models canonical charging stations, the per-request conditions
//! simulated for them, synthetic users and their bookings, and the seam used
//! by both scoring strategies. Constructors validate their input and return
//! `Result` so that downstream feature engineering never sees a station with
//! impossible coordinates or a zero-connector site.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod booking;
pub mod category;
pub mod distance;
pub mod numeric;
pub mod observation;
pub mod scorer;
pub mod station;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
pub mod user;

pub use booking::{Booking, MAX_RATING, MIN_RATING};
pub use category::{ChargerCategory, ParseCategoryError};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use numeric::round_dp;
pub use observation::{StationFeatures, UserPreferences};
pub use scorer::StationScorer;
pub use station::{ConditionsError, Station, StationConditions, StationError};
pub use user::{ChargingFrequency, PreferredSpeed, User};
