//! Date normalization: turns a raw text fragment into a canonical `YYYY-MM-DD` string.
//!
//! Patterns are tried in a fixed order, most explicit first. A pattern whose
//! first structural match carries an implausible year does not end the search;
//! the next pattern gets its turn.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::{Captures, Regex};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTH_ALTERNATION: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap());
static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_ALTERNATION})\s+([0-9]{{1,2}}),?\s+([0-9]{{4}})\b"
    ))
    .unwrap()
});
static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})\s+({MONTH_ALTERNATION})\s+([0-9]{{4}})\b"
    ))
    .unwrap()
});
static SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})\b").unwrap());
static DOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})\b").unwrap());

// Whole-fragment shapes chrono cannot parse on its own: missing day, or month
// spellings such as "Sept". Month tokens are resolved by prefix.
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]{3,9})\.?,?\s+([0-9]{4})$").unwrap());
static MONTH_TOKEN_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]{3,9})\.?\s+([0-9]{1,2}),?\s+([0-9]{4})$").unwrap()
});
static BARE_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]{4})$").unwrap());

/// Whole-string formats accepted by the loose calendar fallback.
const LOOSE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%A, %d-%b-%y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];
const LOOSE_DATE_FORMATS: [&str; 10] = [
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %b, %Y",
    "%a %b %d %Y",
    "%a, %b %d, %Y",
    "%A, %B %d, %Y",
];

/// Inclusive range of years considered plausible for a "last updated" date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub const MIN_YEAR: i32 = 2000;

    /// 2000 through two years past the current UTC year.
    pub fn current() -> Self {
        Self::ending_near(Utc::now().year())
    }

    pub fn ending_near(current_year: i32) -> Self {
        Self {
            min: Self::MIN_YEAR,
            max: current_year + 2,
        }
    }

    fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// Normalizes `text` against the current year bounds.
pub fn normalize(text: &str) -> Option<String> {
    normalize_within(text, YearBounds::current())
}

/// Returns the first date found in `text` as `YYYY-MM-DD`, or `None`.
pub fn normalize_within(text: &str, bounds: YearBounds) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    iso(text, bounds)
        .or_else(|| month_day_year(text, bounds))
        .or_else(|| day_month_year(text, bounds))
        .or_else(|| slash(text, bounds))
        .or_else(|| dot(text, bounds))
        .or_else(|| loose(text, bounds))
}

fn iso(text: &str, bounds: YearBounds) -> Option<String> {
    let caps = ISO_RE.captures(text)?;
    let year = year_in(&caps, 1, bounds)?;
    Some(format!("{year:04}-{}-{}", &caps[2], &caps[3]))
}

fn month_day_year(text: &str, bounds: YearBounds) -> Option<String> {
    let caps = MONTH_DAY_YEAR_RE.captures(text)?;
    let year = year_in(&caps, 3, bounds)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    Some(canonical(year, month, day))
}

fn day_month_year(text: &str, bounds: YearBounds) -> Option<String> {
    let caps = DAY_MONTH_YEAR_RE.captures(text)?;
    let year = year_in(&caps, 3, bounds)?;
    let month = month_number(&caps[2])?;
    let day: u32 = caps[1].parse().ok()?;
    Some(canonical(year, month, day))
}

/// `MM/DD/YYYY`
fn slash(text: &str, bounds: YearBounds) -> Option<String> {
    let caps = SLASH_RE.captures(text)?;
    let year = year_in(&caps, 3, bounds)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    Some(canonical(year, month, day))
}

/// `DD.MM.YYYY`
fn dot(text: &str, bounds: YearBounds) -> Option<String> {
    let caps = DOT_RE.captures(text)?;
    let year = year_in(&caps, 3, bounds)?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[1].parse().ok()?;
    Some(canonical(year, month, day))
}

/// Best-effort parse of the whole trimmed fragment (HTTP dates, RFC 3339,
/// abbreviated months, month-year and bare years). A missing day or month is 01.
fn loose(text: &str, bounds: YearBounds) -> Option<String> {
    let date = parse_calendar(text.trim())?;
    if !bounds.contains(date.year()) {
        return None;
    }
    Some(date.format("%Y-%m-%d").to_string())
}

fn parse_calendar(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    LOOSE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            LOOSE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
        .or_else(|| partial_date(text))
}

fn partial_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_TOKEN_DAY_YEAR_RE.captures(text) {
        let month = month_by_prefix(&caps[1])?;
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?);
    }
    if let Some(caps) = MONTH_YEAR_RE.captures(text) {
        let month = month_by_prefix(&caps[1])?;
        return NaiveDate::from_ymd_opt(caps[2].parse().ok()?, month, 1);
    }
    let caps = BARE_YEAR_RE.captures(text)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 1, 1)
}

fn year_in(caps: &Captures<'_>, group: usize, bounds: YearBounds) -> Option<i32> {
    let year: i32 = caps[group].parse().ok()?;
    bounds.contains(year).then_some(year)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

/// "Mar", "Sept" and "March" all resolve; fewer than three letters never do.
fn month_by_prefix(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

fn canonical(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: YearBounds = YearBounds {
        min: 2000,
        max: 2028,
    };

    fn norm(text: &str) -> Option<String> {
        normalize_within(text, BOUNDS)
    }

    #[test]
    fn test_iso_inside_prose() {
        assert_eq!(
            norm("This policy was revised 2024-06-15 after review").as_deref(),
            Some("2024-06-15")
        );
    }

    #[test]
    fn test_iso_timestamp_keeps_date_part() {
        assert_eq!(
            norm("2023-11-02T08:15:00+00:00").as_deref(),
            Some("2023-11-02")
        );
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(
            norm("Last Modified: March 5, 2022").as_deref(),
            Some("2022-03-05")
        );
        assert_eq!(norm("updated DECEMBER 31 2021").as_deref(), Some("2021-12-31"));
    }

    #[test]
    fn test_day_month_year() {
        assert_eq!(norm("on 7 july 2020, we").as_deref(), Some("2020-07-07"));
    }

    #[test]
    fn test_slash_is_month_first() {
        assert_eq!(norm("Effective 4/9/2023").as_deref(), Some("2023-04-09"));
    }

    #[test]
    fn test_dot_is_day_first() {
        assert_eq!(
            norm("Effective as of 01.02.2021").as_deref(),
            Some("2021-02-01")
        );
    }

    #[test]
    fn test_iso_year_out_of_bounds_is_rejected() {
        assert_eq!(norm("1999-01-01"), None);
        assert_eq!(norm("2099-01-01"), None);
    }

    #[test]
    fn test_out_of_bounds_iso_falls_through_to_next_pattern() {
        assert_eq!(
            norm("ref 1999-01-01, revised January 3, 2021").as_deref(),
            Some("2021-01-03")
        );
    }

    #[test]
    fn test_only_first_structural_match_per_pattern_is_considered() {
        assert_eq!(norm("1999-01-01 and 2021-05-05"), None);
    }

    #[test]
    fn test_iso_preferred_over_month_name() {
        assert_eq!(
            norm("May 1, 2020 (2021-08-09)").as_deref(),
            Some("2021-08-09")
        );
    }

    #[test]
    fn test_http_date_via_loose_parse() {
        assert_eq!(
            norm("Wed, 21 Oct 2015 07:28:00 GMT").as_deref(),
            Some("2015-10-21")
        );
    }

    #[test]
    fn test_abbreviated_month_via_loose_parse() {
        assert_eq!(norm("Mar 5, 2022").as_deref(), Some("2022-03-05"));
        assert_eq!(norm("  2019/11/30 ").as_deref(), Some("2019-11-30"));
    }

    #[test]
    fn test_loose_parse_respects_bounds() {
        assert_eq!(norm("Wed, 21 Oct 1998 07:28:00 GMT"), None);
        assert_eq!(norm("March 1999"), None);
        assert_eq!(norm("2099"), None);
    }

    #[test]
    fn test_month_year_defaults_to_first_day() {
        assert_eq!(norm("March 2022").as_deref(), Some("2022-03-01"));
        assert_eq!(norm("Dec 2021").as_deref(), Some("2021-12-01"));
    }

    #[test]
    fn test_bare_year_is_new_years_day() {
        assert_eq!(norm(" 2022 ").as_deref(), Some("2022-01-01"));
    }

    #[test]
    fn test_sept_spelling() {
        assert_eq!(norm("Sept 5, 2022").as_deref(), Some("2022-09-05"));
    }

    #[test]
    fn test_day_dash_abbreviated_month_dash_year() {
        assert_eq!(norm("05-Mar-2022").as_deref(), Some("2022-03-05"));
    }

    #[test]
    fn test_unrecognized_month_token_is_no_match() {
        assert_eq!(norm("Version 2022"), None);
        assert_eq!(norm("Marchy 2022"), None);
    }

    #[test]
    fn test_no_date() {
        assert_eq!(norm("nothing to see here, version 2"), None);
        assert_eq!(norm(""), None);
        assert_eq!(norm("   "), None);
    }

    #[test]
    fn test_current_bounds_accept_recent_and_reject_far_future() {
        let year = Utc::now().year();
        let text = format!("{year}-01-15");
        assert_eq!(normalize(&text), Some(text.clone()));
        assert_eq!(normalize(&format!("{}-01-15", year + 3)), None);
    }
}
