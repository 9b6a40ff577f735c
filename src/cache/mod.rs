//! Cache module for translated horoscopes
//!
//! This module provides an in-memory cache keyed by zodiac sign and date with
//! a fixed time-to-live per entry, plus an optional background task that
//! sweeps out expired entries. Nothing is persisted across restarts.

mod store;
mod sweeper;

pub use store::{CacheKey, HoroscopeCache, DEFAULT_TTL_SECONDS};
pub use sweeper::{SweepConfig, SweepHandle};
