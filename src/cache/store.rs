//! In-memory horoscope cache keyed by sign and date
//!
//! Provides a `HoroscopeCache` that stores translated horoscopes with an
//! absolute expiry timestamp. Expired entries are evicted lazily on read and
//! in bulk by [`HoroscopeCache::sweep_expired`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::data::ZodiacSign;

/// Default time-to-live for cache entries (24 hours)
pub const DEFAULT_TTL_SECONDS: u64 = 86_400;

/// Composite key identifying one day's horoscope for one sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The zodiac sign
    pub sign: ZodiacSign,
    /// Calendar date the horoscope belongs to
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(sign: ZodiacSign, date: NaiveDate) -> Self {
        Self { sign, date }
    }
}

/// A cached translated horoscope
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Translated horoscope text
    value: String,
    /// When the entry stops being valid
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is valid up to and including its expiry instant
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Thread-safe TTL cache of translated horoscopes
///
/// All operations take `&self` and serialize on a single mutex; map
/// operations are cheap, so contention is not a concern. Callers always
/// receive owned copies of cached values.
#[derive(Debug)]
pub struct HoroscopeCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl Default for HoroscopeCache {
    fn default() -> Self {
        Self::with_ttl_seconds(DEFAULT_TTL_SECONDS)
    }
}

impl HoroscopeCache {
    /// Creates an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Creates an empty cache whose entries live for `seconds`
    pub fn with_ttl_seconds(seconds: u64) -> Self {
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        // Clamp to chrono's supported range instead of overflowing
        let ttl = Duration::try_seconds(seconds).unwrap_or(Duration::MAX);
        Self::new(ttl)
    }

    /// Time-to-live applied to new entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Locks the map, recovering from a poisoned lock
    ///
    /// The map only holds plain values, so a panic in another holder cannot
    /// leave it logically inconsistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads the cached horoscope for `sign` on `date`
    ///
    /// Returns `None` if there is no entry or it has expired. An expired
    /// entry is removed as a side effect.
    pub fn get(&self, sign: ZodiacSign, date: NaiveDate) -> Option<String> {
        let key = CacheKey::new(sign, date);
        let mut entries = self.lock();

        let entry = entries.get(&key)?;
        if entry.is_expired(Utc::now()) {
            entries.remove(&key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores `value` for `sign` on `date`, replacing any previous entry
    ///
    /// The entry expires `ttl` after this call.
    pub fn set(&self, sign: ZodiacSign, value: impl Into<String>, date: NaiveDate) {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.set_expiring_at(CacheKey::new(sign, date), value.into(), expires_at);
    }

    fn set_expiring_at(&self, key: CacheKey, value: String, expires_at: DateTime<Utc>) {
        self.lock().insert(key, CacheEntry { value, expires_at });
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes every expired entry and returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
