use chrono::{Duration, NaiveDateTime};

/// Single-value cache with an explicit expiry timestamp.
///
/// Owned and injected by the embedding process; there is no hidden static.
/// The clock is always supplied by the caller, so cache behavior stays a pure
/// function of its inputs.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<Entry<T>>,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: NaiveDateTime,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached value, or None when empty or expired at `now`.
    pub fn get(&self, now: NaiveDateTime) -> Option<T> {
        self.entry
            .as_ref()
            .filter(|e| now < e.expires_at)
            .map(|e| e.value.clone())
    }

    pub fn put(&mut self, value: T, now: NaiveDateTime) {
        self.entry = Some(Entry {
            value,
            expires_at: now + self.ttl,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        self.entry.as_ref().map(|e| e.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(min: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(min)
    }

    #[test]
    fn empty_cache_misses() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::minutes(5));
        assert_eq!(cache.get(at(0)), None);
        assert_eq!(cache.expires_at(), None);
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let mut cache = TtlCache::new(Duration::minutes(5));
        cache.put(42u32, at(0));
        assert_eq!(cache.get(at(4)), Some(42));
        assert_eq!(cache.get(at(5)), None); // expiry is exclusive
        assert_eq!(cache.expires_at(), Some(at(5)));
    }

    #[test]
    fn invalidate_clears() {
        let mut cache = TtlCache::new(Duration::minutes(5));
        cache.put(42u32, at(0));
        cache.invalidate();
        assert_eq!(cache.get(at(1)), None);
    }

    #[test]
    fn put_refreshes_expiry() {
        let mut cache = TtlCache::new(Duration::minutes(5));
        cache.put(1u32, at(0));
        cache.put(2u32, at(4));
        assert_eq!(cache.get(at(8)), Some(2));
    }
}
