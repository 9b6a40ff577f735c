//! Core data models and upstream clients for horobot
//!
//! This module contains the zodiac catalog, the requested-day type and the
//! clients for the two remote services the bot depends on: the daily
//! horoscope endpoint and the translation backend.

pub mod horoscope;
pub mod translate;
pub mod zodiac;

pub use horoscope::{FetchError, HoroscopeClient, HoroscopeSource};
pub use translate::{GoogleTranslator, TranslateError, TranslationBackend, Translator};
pub use zodiac::{all_signs, get_sign_by_id};

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// One of the twelve zodiac signs
///
/// The discriminant order matches the catalog order in [`zodiac::SIGNS`],
/// which is also the order signs are shown on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// All signs in catalog order
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Returns the static catalog record for this sign
    pub fn info(self) -> &'static SignInfo {
        &zodiac::SIGNS[self as usize]
    }

    /// Lowercase identifier used on the wire and in callback data
    pub fn id(self) -> &'static str {
        self.info().id
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ZodiacSign {
    type Err = ParseSignError;

    /// Parses a sign id case-insensitively ("leo", "Leo", "LEO")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_sign_by_id(s)
            .map(|info| info.sign)
            .ok_or_else(|| ParseSignError(s.to_string()))
    }
}

/// The given string is not one of the twelve catalog ids
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown zodiac sign: '{0}'")]
pub struct ParseSignError(pub String);

/// Immutable catalog record describing a zodiac sign
///
/// Uses `&'static str` fields so the whole catalog can live in a static
/// array. Display names and date ranges are in Russian, the language the
/// bot talks to its users in.
#[derive(Debug, Clone, Copy)]
pub struct SignInfo {
    /// The sign this record describes
    pub sign: ZodiacSign,
    /// Lowercase identifier (e.g., "leo")
    pub id: &'static str,
    /// Name shown to users
    pub display_name: &'static str,
    /// Unicode zodiac glyph
    pub glyph: &'static str,
    /// Human-readable range of birth dates
    pub date_range: &'static str,
}

/// Which day's horoscope the upstream should return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Day {
    Yesterday,
    #[default]
    Today,
    Tomorrow,
}

impl Day {
    /// Identifier sent as the `day` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Yesterday => "yesterday",
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
        }
    }

    /// Calendar date this day refers to, relative to `today`
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        let shifted = match self {
            Day::Yesterday => today.checked_sub_days(Days::new(1)),
            Day::Today => Some(today),
            Day::Tomorrow => today.checked_add_days(Days::new(1)),
        };
        // Only fails at the ends of chrono's representable range
        shifted.unwrap_or(today)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yesterday" => Ok(Day::Yesterday),
            "today" => Ok(Day::Today),
            "tomorrow" => Ok(Day::Tomorrow),
            _ => Err(ParseDayError(s.to_string())),
        }
    }
}

/// The given string is not a supported day
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid day: '{0}'. Valid days: today, yesterday, tomorrow")]
pub struct ParseDayError(pub String);
