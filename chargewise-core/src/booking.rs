//! Synthetic booking outcomes used as training labels.

use chrono::NaiveDateTime;

/// Lowest satisfaction rating.
pub const MIN_RATING: f64 = 1.0;
/// Highest satisfaction rating.
pub const MAX_RATING: f64 = 5.0;

/// One simulated booking of a station by a user.
///
/// Bookings only record facts observed at booking time. Static station
/// attributes such as power and connector count are always read from the
/// canonical [`Station`](crate::Station) when training rows are assembled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Booking {
    /// `"{user}_{sequence}_{station}"`.
    pub booking_id: String,
    /// Booking user.
    pub user_id: u64,
    /// Booked station.
    pub station_id: u64,
    /// When the booking happened.
    pub booked_at: NaiveDateTime,
    /// Distance between the user's home and the station, two decimals.
    pub distance_km: f64,
    /// Free connectors when the booking was attempted.
    pub available_slots_at_booking: u32,
    /// Tariff paid per kWh.
    pub price_paid_per_kwh: f64,
    /// Satisfaction in `1.0..=5.0`, one decimal.
    pub user_rating: f64,
    /// True exactly when at least one slot was free.
    pub booking_completed: bool,
    /// Station's average wait when completed, zero otherwise.
    pub wait_time_minutes: u32,
}

impl Booking {
    /// Record a booking, deriving completion and wait from slot availability.
    ///
    /// `user_rating` is clamped into `1.0..=5.0`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use chargewise_core::Booking;
    ///
    /// let at = NaiveDate::from_ymd_opt(2024, 5, 4)
    ///     .and_then(|d| d.and_hms_opt(10, 0, 0))
    ///     .unwrap_or_default();
    /// let booking = Booking::record(1, 0, 42, at, 3.2, 0, 9.5, 2.1, 25);
    /// assert!(!booking.booking_completed);
    /// assert_eq!(booking.wait_time_minutes, 0);
    /// assert_eq!(booking.booking_id, "1_0_42");
    /// ```
    #[must_use]
    #[expect(
        clippy::too_many_arguments,
        reason = "a booking row is a flat record of independent observations"
    )]
    pub fn record(
        user_id: u64,
        sequence: usize,
        station_id: u64,
        booked_at: NaiveDateTime,
        distance_km: f64,
        available_slots_at_booking: u32,
        price_paid_per_kwh: f64,
        user_rating: f64,
        station_avg_wait_minutes: u32,
    ) -> Self {
        let booking_completed = available_slots_at_booking > 0;
        Self {
            booking_id: format!("{user_id}_{sequence}_{station_id}"),
            user_id,
            station_id,
            booked_at,
            distance_km,
            available_slots_at_booking,
            price_paid_per_kwh,
            user_rating: user_rating.clamp(MIN_RATING, MAX_RATING),
            booking_completed,
            wait_time_minutes: if booking_completed {
                station_avg_wait_minutes
            } else {
                0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 6)
            .and_then(|d| d.and_hms_opt(18, 30, 0))
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(0, false, 0)]
    #[case(1, true, 17)]
    #[case(4, true, 17)]
    fn completion_follows_availability(
        at: NaiveDateTime,
        #[case] slots: u32,
        #[case] completed: bool,
        #[case] wait: u32,
    ) {
        let booking = Booking::record(5, 2, 99, at, 4.0, slots, 11.0, 3.4, 17);
        assert_eq!(booking.booking_completed, completed);
        assert_eq!(booking.wait_time_minutes, wait);
    }

    #[rstest]
    #[case(7.3, 5.0)]
    #[case(-2.0, 1.0)]
    #[case(3.3, 3.3)]
    #[expect(
        clippy::float_arithmetic,
        reason = "tests compare floating point values"
    )]
    fn rating_is_clamped(at: NaiveDateTime, #[case] raw: f64, #[case] expected: f64) {
        let booking = Booking::record(1, 0, 1, at, 1.0, 1, 9.0, raw, 5);
        assert!((booking.user_rating - expected).abs() < f64::EPSILON);
    }
}
