use chrono::NaiveDate;

use crate::model::{AvailabilityWindow, Booking, Span};

use super::intervals::capacity_profile;

// ── Booking overlay ──────────────────────────────────────────────

/// Subtract existing bookings from resolved windows, annotating what is left
/// with remaining capacity. Sub-intervals whose capacity hits zero disappear
/// from the output.
///
/// Only bookings whose status still holds capacity count; cancellations free
/// their slot, a pending-but-unconfirmed booking does not.
pub fn apply_bookings(
    windows: &[Span],
    bookings: &[Booking],
    date: NaiveDate,
    booking_limit: u32,
) -> Vec<AvailabilityWindow> {
    let allocs = day_allocations(bookings, date);

    let mut out = Vec::new();
    for &window in windows {
        out.extend(capacity_profile(window, &allocs, booking_limit));
    }
    out
}

/// Day-local spans of every capacity-holding booking touching `date`,
/// sorted by start.
pub fn day_allocations(bookings: &[Booking], date: NaiveDate) -> Vec<Span> {
    let mut allocs: Vec<Span> = bookings
        .iter()
        .filter(|b| b.status.holds_capacity())
        .filter_map(|b| b.day_span(date))
        .collect();
    allocs.sort_by_key(|s| s.start);
    allocs
}

/// Total capacity-holding booked minutes on `date`.
pub fn booked_minutes(bookings: &[Booking], date: NaiveDate) -> i32 {
    day_allocations(bookings, date)
        .iter()
        .map(Span::duration_min)
        .sum()
}
