//! Date and timestamp codec.
//!
//! Dates travel as `YYYY-MM-DD`, instants as RFC 3339 timestamps in UTC. A
//! null or absent wire value decodes to an absent value; a present string that
//! does not parse is a [`FormatError`], never a silent fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::record::{Record, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A wire value that does not decode to the expected temporal type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("`{0}` is not a YYYY-MM-DD date")]
    Date(String),

    #[error("`{0}` is not a timestamp")]
    Instant(String),

    #[error("field `{field}` holds a {found}, expected a date or timestamp string")]
    NotAString { field: String, found: &'static str },
}

pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// `None` stays `None`; no placeholder string is ever produced.
pub fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(encode_date)
}

pub fn format_instant(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(encode_instant)
}

pub fn parse_date(input: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| FormatError::Date(input.to_string()))
}

/// Parses a timestamp into UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS +ZZZZ`, `YYYY-MM-DD HH:MM:SS UTC`
/// and a bare `YYYY-MM-DD`, which is read as midnight UTC.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, FormatError> {
    let trimmed = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_str(trimmed, OFFSET_TIMESTAMP_FORMAT) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Some(naive) = trimmed.strip_suffix(" UTC") {
        if let Ok(instant) = NaiveDateTime::parse_from_str(naive, NAIVE_TIMESTAMP_FORMAT) {
            return Ok(instant.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| FormatError::Instant(input.to_string()))
}

/// Applies `f` to `field` if the record has that key, otherwise hands the
/// record back untouched. The field keeps its position.
pub fn maybe_transform_field<F, E>(mut record: Record, field: &str, f: F) -> Result<Record, E>
where
    F: FnOnce(Value) -> Result<Value, E>,
{
    if let Some(slot) = record.get_mut(field) {
        let value = std::mem::replace(slot, Value::Null);
        *slot = f(value)?;
    }
    Ok(record)
}

pub fn parse_date_field(record: Record, field: &str) -> Result<Record, FormatError> {
    maybe_transform_field(record, field, |value| match value {
        Value::String(s) => parse_date(&s).map(Value::Date),
        Value::Null | Value::Date(_) => Ok(value),
        other => Err(FormatError::NotAString {
            field: field.to_string(),
            found: other.kind_name(),
        }),
    })
}

pub fn parse_instant_field(record: Record, field: &str) -> Result<Record, FormatError> {
    maybe_transform_field(record, field, |value| match value {
        Value::String(s) => parse_instant(&s).map(Value::Instant),
        Value::Null | Value::Instant(_) => Ok(value),
        other => Err(FormatError::NotAString {
            field: field.to_string(),
            found: other.kind_name(),
        }),
    })
}

/// Parses `created_at` and `updated_at` when present.
pub fn parse_timestamps(record: Record) -> Result<Record, FormatError> {
    let record = parse_instant_field(record, "updated_at")?;
    parse_instant_field(record, "created_at")
}
