use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::PatternSet;

const SCALED_AMOUNT: &str = r"(?i)\$\s*\d+\.?\d*\s*[mb]illi?on";
const GROUPED_AMOUNT: &str = r"\$\s*\d{1,3}(?:[,.]\d{3})+";
/// A grouped amount directly followed by a unit word belongs to the scaled form.
const UNIT_WORD_AHEAD: &str = r"(?i)^\s[mb]illi?on";

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\$\s*\d+(?:[.,]\d+)*)\s*[-‒–—―]\s*\$?\s*\d+(?:[.,]\d+)*")
        .expect("range pattern compiles")
});
/// A grouped lower bound stands alone, so the upper bound's unit word goes with it.
static GROUPED_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"({GROUPED_AMOUNT})\s*[-‒–—―]\s*\$?\s*\d+(?:[.,]\d+)*(?:\s*(?i:[mb]illi?ons?))?"
    ))
    .expect("grouped range pattern compiles")
});
static CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\]\s*").expect("citation pattern compiles"));
static SCALED_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SCALED_AMOUNT).expect("scaled pattern compiles"));
static GROUPED_CANDIDATE: Lazy<PatternSet<()>> = Lazy::new(|| {
    PatternSet::new()
        .guarded_rule("grouped", GROUPED_AMOUNT, UNIT_WORD_AHEAD, |_| Some(()))
        .expect("grouped pattern compiles")
});

static DOLLAR_FORMS: Lazy<PatternSet<f64>> = Lazy::new(|| {
    PatternSet::new()
        .rule("million", r"(?i)^\$\s*\d+\.?\d*\s*milli?ons?", |c| scaled(c, 1e6))
        .and_then(|set| {
            set.rule("billion", r"(?i)^\$\s*\d+\.?\d*\s*billi?ons?", |c| scaled(c, 1e9))
        })
        .and_then(|set| {
            set.guarded_rule(
                "grouped",
                &format!("^{GROUPED_AMOUNT}"),
                UNIT_WORD_AHEAD,
                grouped,
            )
        })
        .expect("dollar patterns compile")
});

fn scaled(caps: &Captures, factor: f64) -> Option<f64> {
    let digits: String = caps
        .get(0)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().map(|v| v * factor)
}

fn grouped(caps: &Captures) -> Option<f64> {
    let digits: String = caps
        .get(0)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse::<f64>().ok()
}

/// Parses an isolated money fragment such as `$1.25 million` or `$1,250,000`.
///
/// Returns `None` ("unknown") for anything that is not one of the known forms.
pub fn parse_dollars(candidate: &str) -> Option<f64> {
    DOLLAR_FORMS.first_match(candidate.trim())
}

/// Collapses `$X – Y` ranges down to their lower bound `$X`.
pub fn collapse_ranges(text: &str) -> String {
    let text = GROUPED_RANGE.replace_all(text, "$1");
    RANGE.replace_all(&text, "$1").into_owned()
}

/// Removes bracketed citation markers such as `[3]`.
pub fn strip_citations(text: &str) -> String {
    CITATION.replace_all(text, "").into_owned()
}

/// Finds the leftmost money-shaped substring; the scaled form wins a tie.
pub fn isolate_candidate(text: &str) -> Option<&str> {
    let scaled = SCALED_CANDIDATE.find(text).map(|m| (m.start(), m.as_str()));
    let grouped = GROUPED_CANDIDATE.rules()[0]
        .find(text)
        .and_then(|caps| caps.get(0))
        .map(|m| (m.start(), m.as_str()));

    match (scaled, grouped) {
        (Some(s), Some(g)) => Some(if g.0 < s.0 { g.1 } else { s.1 }),
        (Some(s), None) => Some(s.1),
        (None, Some(g)) => Some(g.1),
        (None, None) => None,
    }
}

/// Full money pipeline over a longer text blob: ranges, citations, isolation, parse.
pub fn extract_money(text: &str) -> Option<f64> {
    let cleaned = strip_citations(&collapse_ranges(text));
    isolate_candidate(&cleaned).and_then(parse_dollars)
}
