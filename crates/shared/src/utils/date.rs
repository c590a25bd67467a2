use chrono::{NaiveDate, ParseResult};

/// Calendar dates travel between client and server as plain `YYYY-MM-DD`
/// strings with no time or offset component
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_calendar_date<S: AsRef<str>>(value: S) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.as_ref().trim(), CALENDAR_DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        let date = parse_calendar_date("2024-03-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(parse_calendar_date(" 2024-03-05 ").unwrap(), date);
    }

    #[test]
    fn rejects_timestamps_and_garbage() {
        assert!(parse_calendar_date("2024-03-05T12:00:00Z").is_err());
        assert!(parse_calendar_date("yesterday").is_err());
        assert!(parse_calendar_date("2024-02-30").is_err());
    }
}
