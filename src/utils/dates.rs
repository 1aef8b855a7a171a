use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, SecondsFormat, Utc};
use mongodb::bson;

/// Weekday labels indexed by days-from-Sunday, matching the labels the
/// dashboard renders on the weekly engagement chart.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// BSON datetime → chrono UTC datetime
pub fn to_chrono(dt: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

/// chrono UTC datetime → BSON datetime
pub fn to_bson(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

/// Render a stored datetime the way the API emits dates:
/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn to_rfc3339(dt: bson::DateTime) -> String {
    to_chrono(dt).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Day bucket key, e.g. "2025-06-01". All bucketing is UTC.
pub fn day_key(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// UTC midnight of the given instant's day
pub fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// UTC midnight of the first day of the given instant's month
pub fn start_of_month(dt: DateTime<Utc>) -> DateTime<Utc> {
    let date = dt.date_naive();
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Three-letter weekday label ("Sun".."Sat")
pub fn weekday_label(dt: DateTime<Utc>) -> &'static str {
    WEEKDAY_LABELS[dt.weekday().num_days_from_sunday() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_rfc3339_millis() {
        let dt = bson::DateTime::from_millis(1_718_236_800_123);
        assert_eq!(to_rfc3339(dt), "2024-06-13T00:00:00.123Z");
    }

    #[test]
    fn test_day_key() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        assert_eq!(day_key(dt), "2025-06-01");
    }

    #[test]
    fn test_start_of_day() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 45).unwrap();
        let start = start_of_day(dt);
        assert_eq!(day_key(start), "2025-06-01");
        assert_eq!(start.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_start_of_month() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 45).unwrap();
        assert_eq!(day_key(start_of_month(dt)), "2025-06-01");
    }

    #[test]
    fn test_weekday_labels() {
        // 2024-01-01 was a Monday, 2024-01-07 a Sunday
        let monday = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(weekday_label(monday), "Mon");
        let sunday = Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap();
        assert_eq!(weekday_label(sunday), "Sun");
    }

    #[test]
    fn test_bson_chrono_round_trip() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 10, 8, 15, 0).unwrap();
        assert_eq!(to_chrono(to_bson(dt)), dt);
    }
}
