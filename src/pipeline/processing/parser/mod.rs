//! Value parsers: free-text fragments into typed values.
//!
//! Every parser is total. A fragment that matches no known pattern yields
//! the parser's "no data" answer (`None`, or `0` for durations) rather
//! than an error.

pub mod currency;
pub mod date;
pub mod duration;

use regex::{Captures, Regex};
use tracing::trace;

pub use currency::{extract_money, parse_dollars};
pub use date::parse_release_date;
pub use duration::parse_running_time;

/// One entry of a [`PatternSet`]: a pattern and how to turn its captures into a value.
pub struct PatternRule<T> {
    pub name: &'static str,
    pattern: Regex,
    /// The match is discarded when the text right after it matches this.
    not_followed_by: Option<Regex>,
    extract: fn(&Captures) -> Option<T>,
}

impl<T> PatternRule<T> {
    /// First match of this rule anywhere in `text`, honoring the trailing guard.
    pub fn find<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures_iter(text).find(|caps| {
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            match &self.not_followed_by {
                Some(guard) => !guard.is_match(&text[end..]),
                None => true,
            }
        })
    }
}

/// Ordered "first match wins" dispatcher.
///
/// Rules are tried in insertion order; the first rule whose pattern matches
/// decides the outcome, even when its extractor then rejects the captures.
pub struct PatternSet<T> {
    rules: Vec<PatternRule<T>>,
}

impl<T> Default for PatternSet<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> PatternSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(
        mut self,
        name: &'static str,
        pattern: &str,
        extract: fn(&Captures) -> Option<T>,
    ) -> Result<Self, regex::Error> {
        self.rules.push(PatternRule {
            name,
            pattern: Regex::new(pattern)?,
            not_followed_by: None,
            extract,
        });
        Ok(self)
    }

    /// Like [`rule`](Self::rule), but a match immediately followed by `guard` is skipped.
    pub fn guarded_rule(
        mut self,
        name: &'static str,
        pattern: &str,
        guard: &str,
        extract: fn(&Captures) -> Option<T>,
    ) -> Result<Self, regex::Error> {
        self.rules.push(PatternRule {
            name,
            pattern: Regex::new(pattern)?,
            not_followed_by: Some(Regex::new(guard)?),
            extract,
        });
        Ok(self)
    }

    pub fn rules(&self) -> &[PatternRule<T>] {
        &self.rules
    }

    /// Runs the rules in order and returns the deciding rule's result.
    pub fn first_match(&self, text: &str) -> Option<T> {
        self.rules
            .iter()
            .find_map(|rule| {
                rule.find(text).map(|caps| {
                    trace!(rule = rule.name, "pattern rule matched");
                    (rule.extract)(&caps)
                })
            })
            .flatten()
    }
}

/// Parses capture group `i` as a number, treating an empty or absent group as `None`.
pub(crate) fn capture_number<N: std::str::FromStr>(caps: &Captures, i: usize) -> Option<N> {
    caps.get(i)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
