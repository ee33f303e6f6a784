//! Season key ordering and season-label normalization.
//!
//! Canonical keys are always `YYYY-YYYY`, so plain string ordering is
//! chronological and is used directly. Labels scraped from other sources
//! (`95/96`, `2003/04`) are converted to canonical keys here.
//!
//! # Clock injection
//! `normalize_season_label` takes the current year as a parameter rather
//! than reading the clock, so two-digit century resolution is deterministic
//! in tests. `normalize_season_label_now` is the convenience wrapper.

use chrono::Datelike;
use std::fmt;

use crate::model::SeasonKey;

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonOrder {
    /// Oldest season first.
    #[default]
    Ascending,
    /// Most recent season first.
    Descending,
}

/// Sorts season keys in place. Duplicates are kept.
pub fn sort_seasons(keys: &mut [SeasonKey], order: SeasonOrder) {
    match order {
        SeasonOrder::Ascending => keys.sort(),
        SeasonOrder::Descending => keys.sort_by(|a, b| b.cmp(a)),
    }
}

/// Distinct season keys from `keys`, in the requested order.
pub fn distinct_seasons<'a, I>(keys: I, order: SeasonOrder) -> Vec<SeasonKey>
where
    I: IntoIterator<Item = &'a SeasonKey>,
{
    let mut seasons: Vec<SeasonKey> = keys.into_iter().cloned().collect();
    sort_seasons(&mut seasons, order);
    seasons.dedup();
    seasons
}

// ---------------------------------------------------------------------------
// Label normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonLabelError {
    /// Blank label (e.g. an empty section headline).
    Empty,
    /// Not one of `YYYY-YYYY`, `YY/YY` or `YYYY/YY`.
    Unrecognized(String),
}

impl fmt::Display for SeasonLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonLabelError::Empty => write!(f, "Empty season label"),
            SeasonLabelError::Unrecognized(label) => {
                write!(f, "Unrecognized season format: {}", label)
            }
        }
    }
}

impl std::error::Error for SeasonLabelError {}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Converts a season label to a canonical key.
///
/// Two-digit start years are placed in the current century unless that would
/// put them more than a year in the future, in which case the previous
/// century is used. The end year follows the start year's century and rolls
/// over when it would otherwise precede the start (`99/00` → `1999-2000`).
pub fn normalize_season_label(label: &str, current_year: i32) -> Result<SeasonKey, SeasonLabelError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SeasonLabelError::Empty);
    }

    if let Some(key) = SeasonKey::parse(label) {
        return Ok(key);
    }

    let unrecognized = || SeasonLabelError::Unrecognized(label.to_string());
    let (start, end) = label.split_once('/').ok_or_else(unrecognized)?;
    if !all_digits(start) || !all_digits(end) || end.len() != 2 {
        return Err(unrecognized());
    }

    let (full_start, full_end) = match start.len() {
        2 => {
            let start_yy: i32 = start.parse().map_err(|_| unrecognized())?;
            let end_yy: i32 = end.parse().map_err(|_| unrecognized())?;
            let century = current_year.div_euclid(100) * 100;

            let mut full_start = start_yy + century;
            if full_start > current_year + 1 {
                full_start -= 100;
            }
            let mut full_end = end_yy + full_start.div_euclid(100) * 100;
            if full_end < full_start {
                full_end += 100;
            }
            (full_start, full_end)
        }
        4 => {
            let full_start: i32 = start.parse().map_err(|_| unrecognized())?;
            let mut full_end: i32 = format!("{}{}", &start[..2], end)
                .parse()
                .map_err(|_| unrecognized())?;
            if full_end < full_start {
                full_end += 100;
            }
            (full_start, full_end)
        }
        _ => return Err(unrecognized()),
    };

    SeasonKey::parse(&format!("{:04}-{:04}", full_start, full_end)).ok_or_else(unrecognized)
}

/// Convenience wrapper that uses the real current year.
/// Use `normalize_season_label` in tests to keep them deterministic.
pub fn normalize_season_label_now(label: &str) -> Result<SeasonKey, SeasonLabelError> {
    normalize_season_label(label, chrono::Utc::now().year())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
