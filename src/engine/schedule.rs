use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use ulid::Ulid;

use crate::limits::WEEK_DAYS;
use crate::model::{AvailabilityWindow, Booking, TherapistRef};

use super::overlay::booked_minutes;
use super::{EngineError, Scheduler};

// ── Daily / weekly aggregation ───────────────────────────────────

/// One therapist-day: bookings and what is still open, plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySchedule {
    pub therapist_id: Ulid,
    pub date: NaiveDate,
    pub windows: Vec<AvailabilityWindow>,
    /// All bookings touching the date, sorted by start; cancelled ones are
    /// included for display but excluded from the summary.
    pub bookings: Vec<Booking>,
    pub summary: DailySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    pub booking_count: usize,
    pub booked_min: i32,
    pub available_min: i32,
    /// booked / (booked + available); 0.0 on an empty day.
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySchedule {
    pub therapist_id: Ulid,
    pub start_date: NaiveDate,
    pub days: Vec<DailySchedule>,
    pub summary: WeeklySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub booking_count: usize,
    pub booked_min: i32,
    pub available_min: i32,
    pub utilization: f64,
}

/// Admin overview row: one therapist's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TherapistDaySchedule {
    pub therapist: TherapistRef,
    pub schedule: DailySchedule,
}

fn utilization(booked: i32, available: i32) -> f64 {
    let total = booked + available;
    if total == 0 {
        0.0
    } else {
        f64::from(booked) / f64::from(total)
    }
}

impl Scheduler {
    /// Merged timeline for one therapist-day: actual bookings plus remaining
    /// availability, with summary totals.
    pub fn get_therapist_daily_schedule(
        &self,
        therapist_id: Ulid,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<DailySchedule, EngineError> {
        let settings = self.settings(now);
        let bookings = self.load_bookings(therapist_id, date, date);
        self.daily_schedule(therapist_id, date, bookings, &settings)
    }

    /// Seven consecutive days starting at `start_date`.
    pub fn get_therapist_weekly_schedule(
        &self,
        therapist_id: Ulid,
        start_date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<WeeklySchedule, EngineError> {
        let settings = self.settings(now);
        let end_date = start_date
            .checked_add_days(Days::new(u64::from(WEEK_DAYS - 1)))
            .ok_or_else(|| EngineError::validation("startDate", "date out of range"))?;
        let bookings = self.load_bookings(therapist_id, start_date, end_date);

        let mut days = Vec::with_capacity(WEEK_DAYS as usize);
        for offset in 0..WEEK_DAYS {
            let date = start_date
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| EngineError::validation("startDate", "date out of range"))?;
            days.push(self.daily_schedule(therapist_id, date, bookings.clone(), &settings)?);
        }

        let booked_min = days.iter().map(|d| d.summary.booked_min).sum();
        let available_min = days.iter().map(|d| d.summary.available_min).sum();
        let summary = WeeklySummary {
            booking_count: days.iter().map(|d| d.summary.booking_count).sum(),
            booked_min,
            available_min,
            utilization: utilization(booked_min, available_min),
        };

        Ok(WeeklySchedule {
            therapist_id,
            start_date,
            days,
            summary,
        })
    }

    /// Daily fan-out across every active therapist (admin view).
    pub fn get_all_therapists_schedule_overview(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<TherapistDaySchedule>, EngineError> {
        let settings = self.settings(now);
        let mut overview = Vec::new();
        for therapist in self.directory().active_therapists() {
            let bookings = self.load_bookings(therapist.id, date, date);
            let schedule = self.daily_schedule(therapist.id, date, bookings, &settings)?;
            overview.push(TherapistDaySchedule { therapist, schedule });
        }
        Ok(overview)
    }

    fn daily_schedule(
        &self,
        therapist_id: Ulid,
        date: NaiveDate,
        bookings: Vec<Booking>,
        settings: &crate::model::EngineSettings,
    ) -> Result<DailySchedule, EngineError> {
        let mut day_bookings: Vec<Booking> = bookings
            .into_iter()
            .filter(|b| b.day_span(date).is_some())
            .collect();
        day_bookings.sort_by_key(|b| b.start);

        let windows = self.overlaid_windows(therapist_id, date, &day_bookings, settings)?;

        let booked_min = booked_minutes(&day_bookings, date);
        let available_min = windows.iter().map(|w| w.span.duration_min()).sum();
        let summary = DailySummary {
            booking_count: day_bookings
                .iter()
                .filter(|b| b.status.holds_capacity())
                .count(),
            booked_min,
            available_min,
            utilization: utilization(booked_min, available_min),
        };

        Ok(DailySchedule {
            therapist_id,
            date,
            windows,
            bookings: day_bookings,
            summary,
        })
    }
}
