//! Partial-update projection.
//!
//! A field the caller never set must not reach the wire, or the server would
//! clear it. A field explicitly set to null must reach the wire as null.

use crate::record::{Record, Value};

/// Keeps exactly the keys of `record` that appear in `allowed`.
///
/// Values are copied as-is; codec work happens later in the pipeline.
pub fn project(record: &Record, allowed: &[&str]) -> Record {
    record
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Like [`project`], then also projects the records held by the `nested`
/// fields, either a single record or each record in a list.
pub fn project_nested(record: &Record, allowed: &[&str], nested: &[(&str, &[&str])]) -> Record {
    project(record, allowed)
        .into_iter()
        .map(|(key, value)| {
            let value = match nested.iter().find(|(field, _)| *field == key) {
                Some((_, fields)) => project_value(value, fields),
                None => value,
            };
            (key, value)
        })
        .collect()
}

fn project_value(value: Value, allowed: &[&str]) -> Value {
    match value {
        Value::Record(record) => Value::Record(project(&record, allowed)),
        Value::List(items) => Value::List(items.into_iter().map(|item| project_value(item, allowed)).collect()),
        other => other,
    }
}

/// Writes a presence-tracked field into `record`.
///
/// The outer `Option` says whether the caller set the field at all, the inner
/// one whether the value they set is null.
pub fn set_field<T: Into<Value>>(record: &mut Record, key: &str, value: Option<Option<T>>) {
    match value {
        None => {}
        Some(None) => {
            record.insert(key.to_string(), Value::Null);
        }
        Some(Some(v)) => {
            record.insert(key.to_string(), v.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn keeps_only_allowed_present_keys() {
        let data = record! { "name" => "Test", "client_id" => 100, "extra" => true };
        let out = project(&data, &["name", "client_id", "source_url"]);
        assert_eq!(out, record! { "name" => "Test", "client_id" => 100 });
        assert!(!out.contains_key("source_url"));
    }

    #[test]
    fn explicit_null_survives() {
        let data = record! { "end" => Value::Null };
        let out = project(&data, &["start", "end"]);
        assert_eq!(out.get("end"), Some(&Value::Null));
        assert!(!out.contains_key("start"));
    }

    #[test]
    fn empty_inputs() {
        assert!(project(&Record::new(), &["a"]).is_empty());
        assert!(project(&record! { "a" => 1 }, &[]).is_empty());
    }

    #[test]
    fn nested_lists_are_projected_per_element() {
        let data = record! {
            "person_id" => 1,
            "mentorships" => vec![
                Value::from(record! { "person_id" => 3, "salary" => 99999, "end" => Value::Null }),
                Value::from(record! { "person_id" => 4 }),
            ],
            "owner" => record! { "person_id" => 5, "salary" => 1 },
        };
        let nested: &[(&str, &[&str])] = &[("mentorships", &["person_id", "start", "end"]), ("owner", &["person_id"])];
        let out = project_nested(&data, &["person_id", "mentorships", "owner"], nested);
        assert_eq!(
            out,
            record! {
                "person_id" => 1,
                "mentorships" => vec![
                    Value::from(record! { "person_id" => 3, "end" => Value::Null }),
                    Value::from(record! { "person_id" => 4 }),
                ],
                "owner" => record! { "person_id" => 5 },
            }
        );
    }

    #[test]
    fn nested_fields_outside_allowed_are_still_dropped() {
        let data = record! { "mentorships" => Vec::<Value>::new() };
        assert!(project_nested(&data, &["person_id"], &[("mentorships", &["person_id"])]).is_empty());
    }

    #[test]
    fn set_field_tracks_presence() {
        let mut r = Record::new();
        set_field::<String>(&mut r, "name", None);
        set_field::<String>(&mut r, "email", Some(None));
        set_field(&mut r, "first_name", Some(Some("Ada")));
        assert!(!r.contains_key("name"));
        assert_eq!(r["email"], Value::Null);
        assert_eq!(r["first_name"], Value::from("Ada"));
    }
}
