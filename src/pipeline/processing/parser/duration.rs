use once_cell::sync::Lazy;

use super::{capture_number, PatternSet};

static DURATION_FORMS: Lazy<PatternSet<u32>> = Lazy::new(|| {
    PatternSet::new()
        .rule("hours_minutes", r"(?i)(\d+)\s*ho?u?r?s?\s*(\d*)", |c| {
            let hours: u32 = capture_number(c, 1)?;
            let minutes: u32 = capture_number(c, 2).unwrap_or(0);
            hours.checked_mul(60)?.checked_add(minutes)
        })
        .and_then(|set| set.rule("minutes", r"(?i)(\d+)\s*m", |c| capture_number(c, 1)))
        .expect("duration patterns compile")
});

/// Running time in whole minutes, or 0 when the text holds no duration.
pub fn parse_running_time(text: &str) -> u32 {
    DURATION_FORMS.first_match(text).unwrap_or(0)
}
