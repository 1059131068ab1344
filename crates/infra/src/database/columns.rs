//! Column encodings shared by the repositories

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn date_from_sql(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn instant_to_sql(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn instant_from_sql(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

pub fn optional_instant_from_sql(
    idx: usize,
    millis: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|ms| instant_from_sql(idx, ms)).transpose()
}

pub fn count_to_sql(count: Option<u32>) -> Option<i64> {
    count.map(i64::from)
}

pub fn count_from_sql(count: Option<i64>) -> Option<u32> {
    count.and_then(|c| u32::try_from(c).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_iso_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(date_to_sql(date), "2025-03-09");
        assert_eq!(date_from_sql(0, "2025-03-09").unwrap(), date);
        assert!(date_from_sql(0, "09/03/2025").is_err());
    }

    #[test]
    fn instants_keep_millisecond_precision() {
        let at = DateTime::from_timestamp_millis(1_736_000_000_123).unwrap();
        assert_eq!(instant_from_sql(0, instant_to_sql(at)).unwrap(), at);
    }

    #[test]
    fn negative_counts_are_dropped() {
        assert_eq!(count_from_sql(Some(-1)), None);
        assert_eq!(count_from_sql(Some(4)), Some(4));
    }
}
