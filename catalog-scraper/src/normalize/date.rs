//! Strict date parsing: `parse_event_date`.

use chrono::NaiveDate;

/// Parses `raw` strictly as `YYYY-MM-DD`. No other formats are accepted at
/// this layer — a parser that emits a different format is a parser bug,
/// not something this utility repairs.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(
            parse_event_date("2026-02-25"),
            NaiveDate::from_ymd_opt(2026, 2, 25)
        );
    }

    #[test]
    fn rejects_slash_format() {
        assert_eq!(parse_event_date("25/02/2026"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_event_date("not a date"), None);
    }
}
