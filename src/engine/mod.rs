mod conflict;
mod error;
mod intervals;
mod overlay;
mod resolver;
mod schedule;
mod slots;

pub use conflict::check_no_conflict;
pub use error::EngineError;
pub use intervals::{capacity_profile, merge_overlapping, saturated_spans, subtract_spans};
pub use overlay::{apply_bookings, booked_minutes, day_allocations};
pub use resolver::resolve_daily_windows;
pub use schedule::{
    DailySchedule, DailySummary, TherapistDaySchedule, WeeklySchedule, WeeklySummary,
};
pub use slots::{SlotIter, generate_slots};

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;
use ulid::Ulid;

use crate::cache::TtlCache;
use crate::limits::MAX_BOOKING_LIMIT;
use crate::model::{AvailabilityWindow, Booking, EngineSettings, Min, Span};
use crate::store::{BookingStore, RuleStore, ServiceCatalog, SettingsSource, TherapistDirectory};

/// Slot request: either an explicit duration or a service option to take the
/// duration from. Both set is allowed; the explicit duration wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotQuery {
    pub service_option_id: Option<Ulid>,
    pub duration_min: Option<Min>,
}

/// The availability engine. Pure computation over collaborator-loaded data;
/// one instance serves concurrent requests without shared mutable state
/// beyond the settings cache.
pub struct Scheduler {
    rules: Arc<dyn RuleStore>,
    bookings: Arc<dyn BookingStore>,
    catalog: Arc<dyn ServiceCatalog>,
    therapists: Arc<dyn TherapistDirectory>,
    settings_source: Arc<dyn SettingsSource>,
    settings_cache: Mutex<TtlCache<EngineSettings>>,
}

impl Scheduler {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        bookings: Arc<dyn BookingStore>,
        catalog: Arc<dyn ServiceCatalog>,
        therapists: Arc<dyn TherapistDirectory>,
        settings_source: Arc<dyn SettingsSource>,
        settings_ttl: Duration,
    ) -> Self {
        Self {
            rules,
            bookings,
            catalog,
            therapists,
            settings_source,
            settings_cache: Mutex::new(TtlCache::new(settings_ttl)),
        }
    }

    /// Current engine settings, via the injected TTL cache.
    pub fn settings(&self, now: NaiveDateTime) -> EngineSettings {
        let mut cache = self.settings_cache.lock().expect("settings cache poisoned");
        if let Some(settings) = cache.get(now) {
            return settings;
        }
        let settings = self.settings_source.load();
        cache.put(settings, now);
        settings
    }

    /// Drop the cached settings; the next read reloads from the source.
    pub fn invalidate_settings(&self) {
        self.settings_cache
            .lock()
            .expect("settings cache poisoned")
            .invalidate();
    }

    /// Net availability for one therapist-day, before bookings are overlaid.
    pub fn resolve_daily_availability(
        &self,
        therapist_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<Span>, EngineError> {
        if !self.therapists.contains(therapist_id) {
            return Err(EngineError::UnknownTherapist(therapist_id));
        }
        let rules = self.rules.load_active_rules(therapist_id, date);
        let windows = resolve_daily_windows(&rules, date);
        debug!(
            therapist = %therapist_id,
            %date,
            rules = rules.len(),
            windows = windows.len(),
            "resolved daily availability"
        );
        Ok(windows)
    }

    /// Bookable start times for one therapist-day.
    pub fn available_slots(
        &self,
        therapist_id: Ulid,
        date: NaiveDate,
        query: SlotQuery,
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveTime>, EngineError> {
        let settings = self.settings(now);
        let duration = self.resolve_duration(&query, &settings)?;

        let free = self.resolve_daily_availability(therapist_id, date)?;
        let bookings = self.bookings.load_bookings(therapist_id, date, date);
        let limit = self.booking_limit(&query, &settings);
        let windows = apply_bookings(&free, &bookings, date, limit);

        Ok(generate_slots(&windows, duration)
            .map(time_from_min)
            .collect())
    }

    /// Availability windows with bookings already subtracted, for one day.
    pub(super) fn overlaid_windows(
        &self,
        therapist_id: Ulid,
        date: NaiveDate,
        bookings: &[Booking],
        settings: &EngineSettings,
    ) -> Result<Vec<AvailabilityWindow>, EngineError> {
        let free = self.resolve_daily_availability(therapist_id, date)?;
        Ok(apply_bookings(
            &free,
            bookings,
            date,
            settings.default_booking_limit,
        ))
    }

    pub(super) fn load_bookings(
        &self,
        therapist_id: Ulid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<Booking> {
        self.bookings.load_bookings(therapist_id, from, to)
    }

    pub(super) fn directory(&self) -> &dyn TherapistDirectory {
        self.therapists.as_ref()
    }

    fn resolve_duration(
        &self,
        query: &SlotQuery,
        settings: &EngineSettings,
    ) -> Result<Min, EngineError> {
        let duration = match (query.duration_min, query.service_option_id) {
            (Some(d), _) => d,
            (None, Some(id)) => {
                self.catalog
                    .get_option(id)
                    .ok_or(EngineError::UnknownServiceOption(id))?
                    .duration_min
            }
            (None, None) => {
                return Err(EngineError::validation(
                    "duration",
                    "either a duration or a service option is required",
                ));
            }
        };
        if duration < settings.min_duration_min || duration > settings.max_duration_min {
            return Err(EngineError::validation(
                "duration",
                format!(
                    "must be between {} and {} minutes, got {duration}",
                    settings.min_duration_min, settings.max_duration_min
                ),
            ));
        }
        Ok(duration)
    }

    fn booking_limit(&self, query: &SlotQuery, settings: &EngineSettings) -> u32 {
        query
            .service_option_id
            .and_then(|id| self.catalog.booking_limit(id))
            .map(|limit| limit.min(MAX_BOOKING_LIMIT))
            .unwrap_or(settings.default_booking_limit)
            .max(1)
    }
}

/// Day-local minute back to a time-of-day. Slot starts always lie inside the
/// day, so the conversion cannot fail.
pub fn time_from_min(m: Min) -> NaiveTime {
    NaiveTime::from_hms_opt((m / 60) as u32, (m % 60) as u32, 0)
        .expect("slot start within the day")
}
