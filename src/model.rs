use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minutes since local midnight — the unit of all interval arithmetic.
pub type Min = i32;

/// Floor a time-of-day to minute granularity.
pub fn minute_of_day(t: NaiveTime) -> Min {
    (t.hour() * 60 + t.minute()) as Min
}

/// Half-open interval `[start, end)` in day-local minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Min,
    pub end: Min,
}

impl Span {
    pub fn new(start: Min, end: Min) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_min(&self) -> Min {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Min) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// What a schedule rule means for the therapist's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Opens availability for this time range.
    WorkingHours,
    /// Closes availability; always wins over overlapping WorkingHours.
    TimeOff,
}

/// One row of therapist availability policy, as stored.
///
/// Exactly one of `day_of_week` / `specific_date` should be set; the resolver
/// validates this at read time because the store may hold bad rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub id: Ulid,
    pub therapist_id: Ulid,
    pub kind: RuleKind,
    pub day_of_week: Option<Weekday>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
}

impl ScheduleRule {
    /// Day-local span of this rule, floored to minutes.
    pub fn span(&self) -> Span {
        Span::new(minute_of_day(self.start_time), minute_of_day(self.end_time))
    }
}

/// Booking lifecycle. Pending → Confirmed → Completed, with terminal
/// alternatives for cancellations and no-shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    PendingConfirmation,
    Confirmed,
    Completed,
    CancelledByClient,
    CancelledByStaff,
    NoShow,
}

impl BookingStatus {
    /// Whether a booking in this status still holds its time slot.
    /// Pending bookings count — an unconfirmed booking must not be
    /// double-booked out from under the client.
    pub fn holds_capacity(&self) -> bool {
        !matches!(
            self,
            BookingStatus::CancelledByClient | BookingStatus::CancelledByStaff
        )
    }
}

/// Day-of execution substate, independent of the booking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    NoShow,
    Cancelled,
    Rescheduled,
}

/// Attempted booking-status transition that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid transition: {:?} -> {:?}", self.from, self.to)
    }
}

/// One reserved appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub client_id: Ulid,
    /// None while the booking is unassigned.
    pub therapist_id: Option<Ulid>,
    pub service_option_id: Ulid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub session_status: SessionStatus,
    /// Price snapshot taken at creation; never updated afterwards.
    pub price_cents_at_booking: i64,
    pub completed_at: Option<NaiveDateTime>,
}

impl Booking {
    /// Create a booking in its initial state. Derived fields are computed
    /// here, at the call site, never in hidden persistence hooks.
    pub fn new(
        id: Ulid,
        client_id: Ulid,
        therapist_id: Option<Ulid>,
        service_option_id: Ulid,
        start: NaiveDateTime,
        end: NaiveDateTime,
        price_cents: i64,
    ) -> Self {
        debug_assert!(start < end, "booking start must be before end");
        Self {
            id,
            client_id,
            therapist_id,
            service_option_id,
            start,
            end,
            status: BookingStatus::PendingConfirmation,
            session_status: SessionStatus::Scheduled,
            price_cents_at_booking: price_cents,
            completed_at: None,
        }
    }

    pub fn confirm(&mut self) -> Result<(), InvalidTransition> {
        self.transition(BookingStatus::PendingConfirmation, BookingStatus::Confirmed)
    }

    /// Mark completed; `at` is recorded as the completion timestamp.
    pub fn complete(&mut self, at: NaiveDateTime) -> Result<(), InvalidTransition> {
        self.transition(BookingStatus::Confirmed, BookingStatus::Completed)?;
        self.session_status = SessionStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    pub fn cancel_by_client(&mut self) -> Result<(), InvalidTransition> {
        self.cancel(BookingStatus::CancelledByClient)
    }

    pub fn cancel_by_staff(&mut self) -> Result<(), InvalidTransition> {
        self.cancel(BookingStatus::CancelledByStaff)
    }

    pub fn mark_no_show(&mut self) -> Result<(), InvalidTransition> {
        self.transition(BookingStatus::Confirmed, BookingStatus::NoShow)?;
        self.session_status = SessionStatus::NoShow;
        Ok(())
    }

    fn cancel(&mut self, to: BookingStatus) -> Result<(), InvalidTransition> {
        match self.status {
            BookingStatus::PendingConfirmation | BookingStatus::Confirmed => {
                self.status = to;
                self.session_status = SessionStatus::Cancelled;
                Ok(())
            }
            from => Err(InvalidTransition { from, to }),
        }
    }

    fn transition(
        &mut self,
        expect: BookingStatus,
        to: BookingStatus,
    ) -> Result<(), InvalidTransition> {
        if self.status == expect {
            self.status = to;
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Clamp this booking to one calendar date, as a day-local minute span.
    /// Returns None when the booking does not touch that date.
    pub fn day_span(&self, date: NaiveDate) -> Option<Span> {
        let start = if self.start.date() < date {
            0
        } else if self.start.date() == date {
            minute_of_day(self.start.time())
        } else {
            return None;
        };
        let end = if self.end.date() > date {
            crate::limits::MINUTES_PER_DAY
        } else if self.end.date() == date {
            minute_of_day(self.end.time())
        } else {
            return None;
        };
        if start < end { Some(Span::new(start, end)) } else { None }
    }
}

/// Duration + price variant of a service; supplies the slot step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOption {
    pub id: Ulid,
    pub service_id: Ulid,
    pub name: String,
    pub duration_min: Min,
    pub price_cents: i64,
}

/// Derived availability segment — transient, recomputed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub span: Span,
    pub capacity_remaining: u32,
}

/// Therapist as the engine sees it; full profiles live outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapistRef {
    pub id: Ulid,
    pub name: String,
    pub is_active: bool,
}

/// Engine settings loaded from the collaborating configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub min_duration_min: Min,
    pub max_duration_min: Min,
    pub default_booking_limit: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_duration_min: crate::limits::MIN_DURATION_MIN,
            max_duration_min: crate::limits::MAX_DURATION_MIN,
            default_booking_limit: 1,
        }
    }
}
