//! Recursive key-case transformation between the internal and wire forms.
//!
//! # Design
//! Only object keys are rewritten. Arrays keep their length and order, and
//! scalar values (including strings that look like keys) are never touched.
//! Every transform builds a new value from a borrowed one. Keys that are
//! already in the target convention, or in none at all, come out unchanged.
//!
//! The rules are deliberately simple and are not acronym aware, so a round
//! trip is not lossless for every key: `address_line_1` goes out as
//! `addressLine1` and comes back as `address_line1`.

use serde_json::{Map, Value};

use crate::record::Record;

/// Naming convention for a field name in a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Internal records.
    Snake,
    /// Request and response bodies.
    Camel,
    /// Query-string keys.
    Kebab,
}

impl Convention {
    pub fn apply(self, key: &str) -> String {
        match self {
            Convention::Snake => underscore(key),
            Convention::Camel => camelize(key),
            Convention::Kebab => kebabize(key),
        }
    }
}

/// Rewrites every object key in `value` to `convention`.
pub fn to_wire_case(value: &Value, convention: Convention) -> Value {
    transform_keys(value, &|key| convention.apply(key))
}

/// Rewrites every object key in `value` to snake_case.
pub fn to_internal_case(value: &Value) -> Value {
    transform_keys(value, &underscore)
}

fn transform_keys(value: &Value, rewrite: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|item| transform_keys(item, rewrite)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (rewrite(key), transform_keys(item, rewrite)))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar.clone(),
    }
}

/// `start_date` -> `startDate`.
///
/// An underscore is dropped only when it follows a non-underscore character
/// and precedes an ASCII letter or digit, which is then uppercased. Leading
/// and doubled underscores are kept.
pub fn camelize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev: Option<char> = None;
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' && prev.is_some_and(|p| p != '_') {
            if let Some(next) = chars.next_if(char::is_ascii_alphanumeric) {
                out.extend(next.to_uppercase());
                prev = Some(next);
                continue;
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// `start_date` -> `start-date`.
pub fn kebabize(key: &str) -> String {
    key.replace('_', "-")
}

/// `startDate` -> `start_date`, `HTMLParser` -> `html_parser`,
/// `not-found` -> `not_found`.
///
/// An underscore goes between a lowercase letter or digit and the uppercase
/// letter after it, and between an uppercase run and a following
/// uppercase-lowercase pair. Hyphens become underscores and the result is
/// lowercased.
pub fn underscore(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_lowercase() || prev.is_ascii_digit();
            let ends_run = prev.is_uppercase() && next.is_some_and(char::is_lowercase);
            if after_lower || ends_run {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Turns a filter-options record into query pairs with kebab-case keys.
///
/// Null values are dropped. Dates and instants go through the temporal codec;
/// nested values are sent as compact JSON.
pub fn query_pairs(options: &Record) -> Vec<(String, String)> {
    options
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value.to_json() {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (kebabize(key), text)
        })
        .collect()
}
