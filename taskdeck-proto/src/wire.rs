//! Wire formats for due dates and due times.
//!
//! Outgoing values are always the short forms (`YYYY-MM-DD`, `HH:MM`).
//! Incoming values may also be full RFC 3339 timestamps, in which case the
//! UTC date or time component is kept.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

/// Format used for due dates on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for due times on the wire.
pub const TIME_FORMAT: &str = "%H:%M";

/// Time formats accepted on input, tried in order.
const TIME_INPUT_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Parses a due date from `YYYY-MM-DD` or an RFC 3339 timestamp.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Parses a due time from `HH:MM`, `HH:MM:SS` or an RFC 3339 timestamp.
///
/// Due times have minute precision; seconds are dropped.
#[must_use]
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let time = TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).time())
        })?;
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
}

/// Formats a due date for the wire.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a due time for the wire.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Serde adapter for `Option<NaiveDate>` fields.
pub mod date_opt {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes as `YYYY-MM-DD` or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_some(&super::format_date(*date)),
            None => s.serialize_none(),
        }
    }

    /// Deserializes from `YYYY-MM-DD`, an RFC 3339 timestamp, or `null`.
    ///
    /// # Errors
    ///
    /// Returns a custom error for strings that are not a recognizable date.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| {
                super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
            })
            .transpose()
    }
}

/// Serde adapter for `Option<NaiveTime>` fields.
pub mod time_opt {
    use chrono::NaiveTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes as `HH:MM` or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => s.serialize_some(&super::format_time(*time)),
            None => s.serialize_none(),
        }
    }

    /// Deserializes from `HH:MM`, `HH:MM:SS`, an RFC 3339 timestamp, or `null`.
    ///
    /// # Errors
    ///
    /// Returns a custom error for strings that are not a recognizable time.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| {
                super::parse_time(&raw).ok_or_else(|| D::Error::custom(format!("invalid time: {raw}")))
            })
            .transpose()
    }
}
