use chrono::NaiveDate;

use crate::model::{Booking, Span};

use super::EngineError;
use super::intervals::saturated_spans;
use super::overlay::day_allocations;

// ── Commit-time conflict check ───────────────────────────────────

/// Point-in-time re-validation for a candidate booking span, run by the
/// persistence layer inside its booking-commit transaction after re-reading
/// current bookings. The engine only computes; atomicity is the caller's
/// transaction boundary.
///
/// The candidate must lie inside resolved availability and must not overlap
/// a capacity-saturated sub-range.
pub fn check_no_conflict(
    windows: &[Span],
    bookings: &[Booking],
    date: NaiveDate,
    candidate: Span,
    booking_limit: u32,
) -> Result<(), EngineError> {
    if !windows.iter().any(|w| w.contains_span(&candidate)) {
        return Err(EngineError::OutsideAvailability(candidate));
    }

    let allocs = day_allocations(bookings, date);
    if booking_limit <= 1 {
        // Fast path: any overlapping capacity-holding booking is a conflict
        for b in bookings {
            if !b.status.holds_capacity() {
                continue;
            }
            if let Some(span) = b.day_span(date)
                && span.overlaps(&candidate)
            {
                return Err(EngineError::Conflict(b.id));
            }
        }
    } else {
        for sat in saturated_spans(&allocs, booking_limit) {
            if sat.overlaps(&candidate) {
                return Err(EngineError::CapacityExceeded(booking_limit));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Booking, BookingStatus};
    use chrono::NaiveTime;
    use ulid::Ulid;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn booking(h1: u32, h2: u32, status: BookingStatus) -> Booking {
        let mut b = Booking::new(
            Ulid::new(),
            Ulid::new(),
            Some(Ulid::new()),
            Ulid::new(),
            day().and_time(NaiveTime::from_hms_opt(h1, 0, 0).unwrap()),
            day().and_time(NaiveTime::from_hms_opt(h2, 0, 0).unwrap()),
            5000,
        );
        b.status = status;
        b
    }

    #[test]
    fn free_slot_inside_windows_passes() {
        let windows = vec![Span::new(540, 1020)];
        let bookings = vec![booking(10, 11, BookingStatus::Confirmed)];
        assert!(
            check_no_conflict(&windows, &bookings, day(), Span::new(660, 720), 1).is_ok()
        );
    }

    #[test]
    fn overlap_with_existing_booking_rejected() {
        let windows = vec![Span::new(540, 1020)];
        let existing = booking(10, 11, BookingStatus::Confirmed);
        let id = existing.id;
        let err =
            check_no_conflict(&windows, &[existing], day(), Span::new(630, 690), 1)
                .unwrap_err();
        assert_eq!(err, EngineError::Conflict(id));
    }

    #[test]
    fn cancelled_booking_does_not_conflict() {
        let windows = vec![Span::new(540, 1020)];
        let bookings = vec![booking(10, 11, BookingStatus::CancelledByStaff)];
        assert!(
            check_no_conflict(&windows, &bookings, day(), Span::new(600, 660), 1).is_ok()
        );
    }

    #[test]
    fn outside_availability_rejected() {
        let windows = vec![Span::new(540, 720)];
        let err = check_no_conflict(&windows, &[], day(), Span::new(700, 760), 1)
            .unwrap_err();
        assert_eq!(err, EngineError::OutsideAvailability(Span::new(700, 760)));
    }

    #[test]
    fn limit_two_allows_one_concurrent() {
        let windows = vec![Span::new(540, 1020)];
        let bookings = vec![booking(10, 11, BookingStatus::Confirmed)];
        assert!(
            check_no_conflict(&windows, &bookings, day(), Span::new(600, 660), 2).is_ok()
        );
    }

    #[test]
    fn limit_two_rejects_third_concurrent() {
        let windows = vec![Span::new(540, 1020)];
        let bookings = vec![
            booking(10, 11, BookingStatus::Confirmed),
            booking(10, 11, BookingStatus::PendingConfirmation),
        ];
        let err = check_no_conflict(&windows, &bookings, day(), Span::new(600, 660), 2)
            .unwrap_err();
        assert_eq!(err, EngineError::CapacityExceeded(2));
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        let windows = vec![Span::new(540, 1020)];
        let bookings = vec![booking(10, 11, BookingStatus::Confirmed)];
        assert!(
            check_no_conflict(&windows, &bookings, day(), Span::new(660, 720), 1).is_ok()
        );
    }
}
