use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Captures;

use super::{capture_number, PatternSet};

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static DATE_FORMS: Lazy<PatternSet<NaiveDate>> = Lazy::new(|| {
    PatternSet::new()
        .rule(
            "month_day_year",
            &format!(r"(?i)\b({MONTHS})\s+(0?[1-9]|[12]\d|3[01])\b,\s*(\d{{4}})"),
            |c| ymd(capture_number(c, 3)?, month_number(c, 1)?, capture_number(c, 2)?),
        )
        .and_then(|set| {
            set.rule("iso_like", r"(\d{4})[^\d](\d{2})[^\d](\d{2})", |c| {
                ymd(capture_number(c, 1)?, capture_number(c, 2)?, capture_number(c, 3)?)
            })
        })
        .and_then(|set| {
            set.rule(
                "month_year",
                &format!(r"(?i)\b({MONTHS})\s+(\d{{4}})"),
                |c| ymd(capture_number(c, 2)?, month_number(c, 1)?, 1),
            )
        })
        .and_then(|set| {
            set.rule("year", r"(\d{4})", |c| ymd(capture_number(c, 1)?, 1, 1))
        })
        .expect("date patterns compile")
});

fn month_number(caps: &Captures, i: usize) -> Option<u32> {
    caps.get(i)?
        .as_str()
        .parse::<Month>()
        .ok()
        .map(|m| m.number_from_month())
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Extracts a calendar date from free text.
///
/// Forms are tried in order: `January 5, 2003`, `2003-01-05`, `January 2003`
/// (day 1), bare `2003` (January 1). The first form that matches anywhere
/// decides; an impossible date such as `February 30, 2003` is unparseable.
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMS.first_match(text)
}
