//! Static zodiac sign catalog
//!
//! This module contains the fixed list of the twelve zodiac signs with the
//! glyphs, Russian names and birth-date ranges shown to users.

use super::{SignInfo, ZodiacSign};

/// Static array of all zodiac signs, indexed by `ZodiacSign as usize`
pub static SIGNS: [SignInfo; 12] = [
    SignInfo {
        sign: ZodiacSign::Aries,
        id: "aries",
        display_name: "Овен",
        glyph: "♈",
        date_range: "21 марта - 19 апреля",
    },
    SignInfo {
        sign: ZodiacSign::Taurus,
        id: "taurus",
        display_name: "Телец",
        glyph: "♉",
        date_range: "20 апреля - 20 мая",
    },
    SignInfo {
        sign: ZodiacSign::Gemini,
        id: "gemini",
        display_name: "Близнецы",
        glyph: "♊",
        date_range: "21 мая - 20 июня",
    },
    SignInfo {
        sign: ZodiacSign::Cancer,
        id: "cancer",
        display_name: "Рак",
        glyph: "♋",
        date_range: "21 июня - 22 июля",
    },
    SignInfo {
        sign: ZodiacSign::Leo,
        id: "leo",
        display_name: "Лев",
        glyph: "♌",
        date_range: "23 июля - 22 августа",
    },
    SignInfo {
        sign: ZodiacSign::Virgo,
        id: "virgo",
        display_name: "Дева",
        glyph: "♍",
        date_range: "23 августа - 22 сентября",
    },
    SignInfo {
        sign: ZodiacSign::Libra,
        id: "libra",
        display_name: "Весы",
        glyph: "♎",
        date_range: "23 сентября - 22 октября",
    },
    SignInfo {
        sign: ZodiacSign::Scorpio,
        id: "scorpio",
        display_name: "Скорпион",
        glyph: "♏",
        date_range: "23 октября - 21 ноября",
    },
    SignInfo {
        sign: ZodiacSign::Sagittarius,
        id: "sagittarius",
        display_name: "Стрелец",
        glyph: "♐",
        date_range: "22 ноября - 21 декабря",
    },
    SignInfo {
        sign: ZodiacSign::Capricorn,
        id: "capricorn",
        display_name: "Козерог",
        glyph: "♑",
        date_range: "22 декабря - 19 января",
    },
    SignInfo {
        sign: ZodiacSign::Aquarius,
        id: "aquarius",
        display_name: "Водолей",
        glyph: "♒",
        date_range: "20 января - 18 февраля",
    },
    SignInfo {
        sign: ZodiacSign::Pisces,
        id: "pisces",
        display_name: "Рыбы",
        glyph: "♓",
        date_range: "19 февраля - 20 марта",
    },
];

/// Get a sign record by its id, ignoring ASCII case
///
/// # Arguments
///
/// * `id` - The sign identifier (e.g., "leo", "Sagittarius")
///
/// # Returns
///
/// Returns `Some(&SignInfo)` if found, `None` otherwise
///
/// # Example
///
/// ```
/// use horobot::data::zodiac::get_sign_by_id;
///
/// if let Some(info) = get_sign_by_id("Leo") {
///     println!("Found: {} {}", info.glyph, info.display_name);
/// }
/// ```
pub fn get_sign_by_id(id: &str) -> Option<&'static SignInfo> {
    SIGNS.iter().find(|info| info.id.eq_ignore_ascii_case(id))
}

/// Get all zodiac signs in catalog order
///
/// # Example
///
/// ```
/// use horobot::data::zodiac::all_signs;
///
/// for info in all_signs() {
///     println!("{} {} ({})", info.glyph, info.display_name, info.date_range);
/// }
/// ```
pub fn all_signs() -> &'static [SignInfo] {
    &SIGNS
}
