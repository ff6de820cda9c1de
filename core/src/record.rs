//! The internal record model.
//!
//! # Design
//! Wire JSON only knows strings for dates, so the internal side gets its own
//! tagged union with `Date` and `Instant` variants. A `Record` is keyed by
//! snake_case field names. An absent key means the caller never set the field;
//! a key holding `Value::Null` means the caller set it to null. The projector
//! and the update builders rely on that difference. Keys keep insertion
//! order, so a body goes out in the order the caller built it and a decoded
//! record keeps the order of the wire object.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde_json::Number;

use crate::temporal;

/// A snake_case-keyed record of internal values.
pub type Record = IndexMap<String, Value>;

/// A value in the internal model.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(NaiveDate),
    Instant(DateTime<Utc>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Instant(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Instant(_) => "instant",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Converts to JSON, encoding dates and instants with the temporal codec.
    /// Keys are left as they are.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(temporal::encode_date(*d)),
            Value::Instant(i) => serde_json::Value::String(temporal::encode_instant(*i)),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(record) => record_to_json(record),
        }
    }
}

pub fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Record(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(i: DateTime<Utc>) -> Self {
        Value::Instant(i)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a [`Record`] from `key => value` pairs.
///
/// ```
/// use warehouse_core::{record, Value};
///
/// let r = record! { "name" => "Acme", "client_id" => 100 };
/// assert_eq!(r["client_id"], Value::from(100));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($key), $crate::Value::from($value));)+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_records() {
        let value = Value::from(json!({"name": "x", "tags": [1, null]}));
        let record = value.as_record().unwrap();
        assert_eq!(record["name"], Value::from("x"));
        assert_eq!(
            record["tags"],
            Value::List(vec![Value::from(1), Value::Null])
        );
    }

    #[test]
    fn dates_encode_as_wire_strings() {
        let r = record! {
            "start" => NaiveDate::from_ymd_opt(2001, 2, 3).unwrap(),
            "end" => Option::<NaiveDate>::None,
        };
        assert_eq!(record_to_json(&r), json!({"end": null, "start": "2001-02-03"}));
    }

    #[test]
    fn records_keep_insertion_and_wire_order() {
        let built = record! { "start" => 1, "end" => 2, "confidence_percentage" => 3 };
        let keys: Vec<&str> = built.keys().map(String::as_str).collect();
        assert_eq!(keys, ["start", "end", "confidence_percentage"]);

        let wire: serde_json::Value = serde_json::from_str(r#"{"z":1,"a":{"y":2,"b":3}}"#).unwrap();
        let decoded = Value::from(wire);
        let record = decoded.as_record().unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["z", "a"]);
        let nested = record["a"].as_record().unwrap();
        assert_eq!(nested.keys().collect::<Vec<_>>(), ["y", "b"]);
        assert_eq!(
            serde_json::to_string(&record_to_json(record)).unwrap(),
            r#"{"z":1,"a":{"y":2,"b":3}}"#
        );
    }

    #[test]
    fn non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
    }
}
