use crate::model::Min;

/// Minutes in one calendar day; day-local spans never exceed this.
pub const MINUTES_PER_DAY: Min = 24 * 60;

/// Shortest bookable appointment duration in minutes.
pub const MIN_DURATION_MIN: Min = 15;

/// Longest bookable appointment duration in minutes.
pub const MAX_DURATION_MIN: Min = 480;

/// Days covered by a weekly schedule query.
pub const WEEK_DAYS: u32 = 7;

/// Upper bound on a per-service concurrent-booking limit.
pub const MAX_BOOKING_LIMIT: u32 = 64;
