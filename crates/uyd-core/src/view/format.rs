use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Character budget for descriptions on cards and in the news list
pub const CARD_DESCRIPTION_BUDGET: usize = 150;

/// Character budget for descriptions on the events page
pub const LIST_DESCRIPTION_BUDGET: usize = 200;

const ELLIPSIS: &str = "...";

/// Keep the first `budget` characters of `text`, appending an ellipsis only
/// when something was cut.
pub fn truncate(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Parse the timestamp formats the backend emits.
/// Offsets are dropped; the wall-clock time is what gets displayed.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Date pieces used by every event and news view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateParts {
    /// Upper-case month abbreviation, e.g. "MAR"
    pub month: String,
    /// Day of month without padding, e.g. "8"
    pub day: String,
    /// 12-hour clock with meridiem, e.g. "09:30 AM"
    pub time: String,
    /// e.g. "Mar 8, 2025"
    pub long: String,
}

impl DateParts {
    /// Break `raw` into display pieces; unparseable or missing dates give
    /// empty strings.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.and_then(parse_datetime) {
            Some(dt) => Self {
                month: dt.format("%b").to_string().to_uppercase(),
                day: dt.day().to_string(),
                time: dt.format("%I:%M %p").to_string(),
                long: format!("{} {}, {}", dt.format("%b"), dt.day(), dt.year()),
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello", 5), "Hello");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("Hello World", 5), "Hello...");
        assert_eq!(truncate("abc", 0), "...");
    }

    #[test]
    fn test_truncate_law() {
        let budget = 150;
        for len in [0usize, 1, 149, 150, 151, 300] {
            let text = "a".repeat(len);
            let shown = truncate(&text, budget);
            let expected_len = len.min(budget) + if len > budget { ELLIPSIS.len() } else { 0 };
            assert_eq!(shown.chars().count(), expected_len, "len {len}");
            assert_eq!(shown.ends_with(ELLIPSIS), len > budget, "len {len}");
        }
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Karibu sana ñoño", 13), "Karibu sana ñ...");
        assert_eq!(truncate("ñññ", 3), "ñññ");
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 8)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-03-08T09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2025-03-08T09:30:00.000123").map(|d| d.date()), Some(expected.date()));
        assert_eq!(parse_datetime("2025-03-08 09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2025-03-08T09:30:00+03:00"), Some(expected));
        assert_eq!(parse_datetime("2025-03-08T09:30"), Some(expected));
        assert_eq!(parse_datetime("2025-03-08").map(|d| d.date()), Some(expected.date()));
        assert_eq!(parse_datetime("next tuesday"), None);
    }

    #[test]
    fn test_date_parts() {
        let parts = DateParts::from_raw(Some("2025-03-08T09:30:00"));
        assert_eq!(parts.month, "MAR");
        assert_eq!(parts.day, "8");
        assert_eq!(parts.time, "09:30 AM");
        assert_eq!(parts.long, "Mar 8, 2025");
    }

    #[test]
    fn test_date_parts_afternoon_time() {
        assert_eq!(DateParts::from_raw(Some("2025-03-08T14:05:00")).time, "02:05 PM");
        assert_eq!(DateParts::from_raw(Some("2025-03-08T00:15:00")).time, "12:15 AM");
        assert_eq!(DateParts::from_raw(Some("2025-03-08T12:00:00")).time, "12:00 PM");
    }

    #[test]
    fn test_date_parts_missing_or_invalid() {
        assert_eq!(DateParts::from_raw(None), DateParts::default());
        assert_eq!(DateParts::from_raw(Some("soon")), DateParts::default());
    }
}
