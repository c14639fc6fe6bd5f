//! Answer parsers for free-text questionnaire replies.
//!
//! Each parser returns `None` when the text is unusable or out of range, so
//! the caller can repeat the question.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static BLOOD_PRESSURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,3})\s*/\s*(\d{1,3})").expect("valid regex"));

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid regex"));

/// Accepted date layouts for the last menstrual period, day first.
///
/// Two-digit years come first: `%Y` also accepts `24` as year 0024.
const LMP_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
];

const MAX_GESTATIONAL_WEEKS: i64 = 45;

/// Parse either a gestational age in weeks or a last-menstrual-period date.
///
/// A bare integer in 0..=45 is taken as weeks. Otherwise the text is parsed
/// as a date and converted to completed weeks before `today`.
pub fn weeks_or_lmp(text: &str, today: NaiveDate) -> Option<u32> {
    let text = text.trim();

    if let Ok(weeks) = text.parse::<i64>() {
        if (0..=MAX_GESTATIONAL_WEEKS).contains(&weeks) {
            return Some(weeks as u32);
        }
    }

    let lmp = LMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())?;
    let weeks = (today - lmp).num_days().div_euclid(7);
    (0..=MAX_GESTATIONAL_WEEKS)
        .contains(&weeks)
        .then_some(weeks as u32)
}

/// Parse a blood pressure reading into `(systolic, diastolic)` mmHg.
///
/// Accepts `12x8`, `12/8`, `12 8` and `120/80`. Readings given in cmHg
/// (both values below 30) are scaled to mmHg.
pub fn blood_pressure(text: &str) -> Option<(u32, u32)> {
    let normalized = text
        .to_lowercase()
        .replace(',', ".")
        .trim()
        .replace('x', "/")
        .replace(' ', "/");
    let caps = BLOOD_PRESSURE_RE.captures(&normalized)?;
    let mut systolic: u32 = caps[1].parse().ok()?;
    let mut diastolic: u32 = caps[2].parse().ok()?;
    if systolic < 30 && diastolic < 30 {
        systolic *= 10;
        diastolic *= 10;
    }
    ((60..=260).contains(&systolic) && (30..=180).contains(&diastolic))
        .then_some((systolic, diastolic))
}

fn first_number(text: &str) -> Option<f64> {
    let normalized = text.to_lowercase().replace(',', ".");
    let caps = NUMBER_RE.captures(&normalized)?;
    caps[1].parse().ok()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Weight in kilograms, 30–250, one decimal.
pub fn weight_kg(text: &str) -> Option<f64> {
    let w = first_number(text)?;
    (30.0..=250.0).contains(&w).then(|| round_to(w, 1))
}

/// Height in metres, 1.30–2.20, two decimals.
pub fn height_m(text: &str) -> Option<f64> {
    let h = first_number(text)?;
    (1.3..=2.2).contains(&h).then(|| round_to(h, 2))
}

/// Body mass index, one decimal.
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    round_to(weight_kg / (height_m * height_m), 1)
}

/// Parse a comma/semicolon separated list of option ids.
///
/// Returns the deduplicated, sorted ids, or `None` when the list is empty or
/// contains anything outside `1..=max`. Ids are written exactly as listed:
/// no sign, no leading zero.
pub fn option_ids(text: &str, max: u8) -> Option<Vec<u8>> {
    let mut ids = BTreeSet::new();
    for part in text.replace(';', ",").split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.starts_with('0') || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id: u8 = part.parse().ok()?;
        if !(1..=max).contains(&id) {
            return None;
        }
        ids.insert(id);
    }
    (!ids.is_empty()).then(|| ids.into_iter().collect())
}

/// Parse a whole number within `range`.
pub fn integer_in(text: &str, range: std::ops::RangeInclusive<u32>) -> Result<u32, IntegerError> {
    let value: i64 = text.trim().parse().map_err(|_| IntegerError::NotANumber)?;
    u32::try_from(value)
        .ok()
        .filter(|v| range.contains(v))
        .ok_or(IntegerError::OutOfRange)
}

/// Why [`integer_in`] rejected an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    NotANumber,
    OutOfRange,
}

/// Whether the reply is the skip keyword.
pub fn is_skip(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("PULAR")
}
