//! Wire representations of YouTrack timestamps and dates.
//!
//! The API transmits every instant as milliseconds since the Unix epoch.
//! Calendar dates (e.g. a "Due Date" custom field) travel as the millisecond
//! timestamp of **noon UTC** on that day, which keeps the date stable across
//! the timezones a browser might render it in.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fields::{FieldSelection, FieldSpec};

/// A point in time, carried on the wire as epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds.
    ///
    /// Returns `None` when the value is outside the representable range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Epoch milliseconds of this instant.
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The underlying UTC datetime.
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        Timestamp::from_millis(millis).ok_or_else(|| {
            serde::de::Error::custom(format!("timestamp out of range: {millis}"))
        })
    }
}

/// A calendar date, carried on the wire as the epoch milliseconds of noon UTC.
///
/// Deserialization subtracts twelve hours before taking the date, so any
/// millisecond value within the day maps back to the same date it was
/// serialized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from a year, month and day.
    ///
    /// Returns `None` for out-of-range components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Epoch milliseconds of noon UTC on this date.
    pub fn as_millis(&self) -> i64 {
        self.0
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time of day")
            .and_utc()
            .timestamp_millis()
    }

    /// The underlying calendar date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl FieldSelection for Date {
    /// Dates are scalar on the wire; there is nothing to subselect.
    fn fields() -> FieldSpec {
        FieldSpec::new()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            serde::de::Error::custom(format!("date timestamp out of range: {millis}"))
        })?;
        Ok(Self((instant - Duration::hours(12)).date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_serializes_to_millis() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2021, 2, 9, 14, 3, 11).unwrap());
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1612879391000");
    }

    #[test]
    fn test_timestamp_deserializes_from_millis() {
        let ts: Timestamp = serde_json::from_str("1612879391000").unwrap();
        assert_eq!(
            ts.datetime(),
            Utc.with_ymd_and_hms(2021, 2, 9, 14, 3, 11).unwrap()
        );
    }

    #[test]
    fn test_timestamp_rejects_non_integer() {
        assert!(serde_json::from_str::<Timestamp>("\"2021-02-09\"").is_err());
    }

    #[test]
    fn test_date_serializes_to_noon_utc() {
        let date = Date::from_ymd(2022, 2, 17).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "1645099200000");
    }

    #[test]
    fn test_date_deserializes_from_noon_utc() {
        let date: Date = serde_json::from_str("1645099200000").unwrap();
        assert_eq!(date, Date::from_ymd(2022, 2, 17).unwrap());
    }

    #[test]
    fn test_date_round_trips_from_midnight() {
        // A server sending midnight instead of noon still lands on the
        // same day once the twelve-hour offset is applied.
        let midnight = Utc
            .with_ymd_and_hms(2022, 2, 17, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        let date: Date = serde_json::from_str(&midnight.to_string()).unwrap();
        assert_eq!(date, Date::from_ymd(2022, 2, 16).unwrap());

        let noon: Date = serde_json::from_str(
            &Date::from_ymd(2022, 2, 17).unwrap().as_millis().to_string(),
        )
        .unwrap();
        assert_eq!(noon, Date::from_ymd(2022, 2, 17).unwrap());
    }

    #[test]
    fn test_display() {
        let date = Date::from_ymd(2022, 2, 17).unwrap();
        assert_eq!(date.to_string(), "2022-02-17");

        let ts = Timestamp::from_millis(0).unwrap();
        assert_eq!(ts.to_string(), "1970-01-01T00:00:00+00:00");
    }
}
