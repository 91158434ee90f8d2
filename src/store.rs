use chrono::NaiveDate;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Booking, EngineSettings, ScheduleRule, ServiceOption, TherapistRef};

// ── Collaborator contracts ───────────────────────────────────────
//
// The engine performs no I/O of its own; these traits hand it
// already-fetched collections. Database-backed implementations live with the
// persistence layer and carry their own retry policy.

pub trait RuleStore: Send + Sync {
    /// Active schedule rules for one therapist, candidates for `date`.
    /// The resolver re-filters; returning a superset is fine.
    fn load_active_rules(&self, therapist_id: Ulid, date: NaiveDate) -> Vec<ScheduleRule>;
}

pub trait BookingStore: Send + Sync {
    /// Non-deleted bookings for one therapist whose interval intersects
    /// `[from, to]` (inclusive date range).
    fn load_bookings(&self, therapist_id: Ulid, from: NaiveDate, to: NaiveDate)
    -> Vec<Booking>;
}

pub trait ServiceCatalog: Send + Sync {
    fn get_option(&self, id: Ulid) -> Option<ServiceOption>;
    /// Per-service concurrent-booking limit, when one is configured.
    fn booking_limit(&self, service_option_id: Ulid) -> Option<u32>;
}

pub trait TherapistDirectory: Send + Sync {
    fn contains(&self, id: Ulid) -> bool;
    fn active_therapists(&self) -> Vec<TherapistRef>;
}

pub trait SettingsSource: Send + Sync {
    fn load(&self) -> EngineSettings;
}

// ── In-memory reference implementation ───────────────────────────

/// Backing store for tests and embedded use. Indexes mirror what a
/// database-backed implementation would query by.
#[derive(Default)]
pub struct InMemoryStore {
    therapists: DashMap<Ulid, TherapistRef>,
    rules_by_therapist: DashMap<Ulid, Vec<ScheduleRule>>,
    bookings_by_therapist: DashMap<Ulid, Vec<Booking>>,
    options: DashMap<Ulid, ServiceOption>,
    booking_limits: DashMap<Ulid, u32>,
    settings: std::sync::Mutex<EngineSettings>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_therapist(&self, therapist: TherapistRef) {
        self.therapists.insert(therapist.id, therapist);
    }

    pub fn add_rule(&self, rule: ScheduleRule) {
        self.rules_by_therapist
            .entry(rule.therapist_id)
            .or_default()
            .push(rule);
    }

    pub fn add_booking(&self, booking: Booking) {
        if let Some(tid) = booking.therapist_id {
            self.bookings_by_therapist
                .entry(tid)
                .or_default()
                .push(booking);
        }
    }

    pub fn add_option(&self, option: ServiceOption) {
        self.options.insert(option.id, option);
    }

    pub fn set_booking_limit(&self, service_option_id: Ulid, limit: u32) {
        self.booking_limits.insert(service_option_id, limit);
    }

    pub fn set_settings(&self, settings: EngineSettings) {
        *self.settings.lock().expect("settings lock poisoned") = settings;
    }
}

impl RuleStore for InMemoryStore {
    fn load_active_rules(&self, therapist_id: Ulid, _date: NaiveDate) -> Vec<ScheduleRule> {
        self.rules_by_therapist
            .get(&therapist_id)
            .map(|rules| rules.iter().filter(|r| r.is_active).cloned().collect())
            .unwrap_or_default()
    }
}

impl BookingStore for InMemoryStore {
    fn load_bookings(
        &self,
        therapist_id: Ulid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<Booking> {
        self.bookings_by_therapist
            .get(&therapist_id)
            .map(|bookings| {
                bookings
                    .iter()
                    .filter(|b| b.start.date() <= to && b.end.date() >= from)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ServiceCatalog for InMemoryStore {
    fn get_option(&self, id: Ulid) -> Option<ServiceOption> {
        self.options.get(&id).map(|o| o.value().clone())
    }

    fn booking_limit(&self, service_option_id: Ulid) -> Option<u32> {
        self.booking_limits
            .get(&service_option_id)
            .map(|l| *l.value())
    }
}

impl TherapistDirectory for InMemoryStore {
    fn contains(&self, id: Ulid) -> bool {
        self.therapists.contains_key(&id)
    }

    fn active_therapists(&self) -> Vec<TherapistRef> {
        let mut active: Vec<TherapistRef> = self
            .therapists
            .iter()
            .filter(|t| t.value().is_active)
            .map(|t| t.value().clone())
            .collect();
        active.sort_by_key(|t| t.id);
        active
    }
}

impl SettingsSource for InMemoryStore {
    fn load(&self) -> EngineSettings {
        *self.settings.lock().expect("settings lock poisoned")
    }
}
