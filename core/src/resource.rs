//! Per-resource configuration.
//!
//! # Design
//! A resource is data, not code. It lists where it lives, which fields a
//! create or update may send, and how a response record is decoded. The
//! client reads these tables, so adding an entity means adding a `static`
//! here, not another set of request builders.

use std::fmt;

use crate::case::to_internal_case;
use crate::error::ApiError;
use crate::record::{Record, Value};
use crate::temporal::{self, maybe_transform_field, FormatError};

/// How to decode a record coming off the wire.
///
/// `created_at` and `updated_at` are always parsed as instants.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub dates: &'static [&'static str],
    pub instants: &'static [&'static str],
    /// Sub-fields holding a record or a list of records, decoded with their
    /// own shape.
    pub nested: &'static [(&'static str, &'static Shape)],
}

impl Shape {
    /// Only the timestamps.
    pub const PLAIN: Shape = Shape {
        dates: &[],
        instants: &[],
        nested: &[],
    };

    /// Normalizes a wire object into an internal record: snake_case keys,
    /// then the temporal fields.
    pub fn decode(&self, json: &serde_json::Value) -> Result<Record, ApiError> {
        match Value::from(to_internal_case(json)) {
            Value::Record(record) => Ok(self.parse(record)?),
            other => Err(ApiError::Deserialization(format!(
                "expected an object, got a {}",
                other.kind_name()
            ))),
        }
    }

    /// Parses the temporal fields of an already snake_cased record.
    pub fn parse(&self, record: Record) -> Result<Record, FormatError> {
        let mut record = temporal::parse_timestamps(record)?;
        for field in self.dates {
            record = temporal::parse_date_field(record, field)?;
        }
        for field in self.instants {
            record = temporal::parse_instant_field(record, field)?;
        }
        for (field, shape) in self.nested {
            record = maybe_transform_field(record, field, |value| shape.parse_value(value))?;
        }
        Ok(record)
    }

    fn parse_value(&self, value: Value) -> Result<Value, FormatError> {
        match value {
            Value::Record(record) => self.parse(record).map(Value::Record),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.parse_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            other => Ok(other),
        }
    }
}

/// A remote collection and its field configuration.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    /// Used in log lines and errors.
    pub name: &'static str,
    pub path: &'static str,
    /// snake_case key holding the list in collection responses.
    pub collection: &'static str,
    /// Fields a create may send, or `None` when the service cannot create.
    pub create_fields: Option<&'static [&'static str]>,
    /// Fields an update may send, or `None` when the service cannot update.
    pub update_fields: Option<&'static [&'static str]>,
    /// Fields allowed inside nested records that are sent along.
    pub nested_fields: &'static [(&'static str, &'static [&'static str])],
    pub deletable: bool,
    /// Fields sent as `YYYY-MM-DD` even when the caller passed an instant.
    pub date_fields: &'static [&'static str],
    pub shape: Shape,
    /// Whether a 404 on lookup by id means "no such record" rather than an
    /// error.
    pub missing_is_none: bool,
}

impl Resource {
    pub fn member_path(&self, id: impl fmt::Display) -> String {
        format!("{}/{id}", self.path)
    }

    pub fn fields_for_create(&self) -> Result<&'static [&'static str], ApiError> {
        self.create_fields.ok_or_else(|| self.unsupported("create"))
    }

    pub fn fields_for_update(&self) -> Result<&'static [&'static str], ApiError> {
        self.update_fields.ok_or_else(|| self.unsupported("update"))
    }

    pub fn check_deletable(&self) -> Result<(), ApiError> {
        if self.deletable {
            Ok(())
        } else {
            Err(self.unsupported("delete"))
        }
    }

    fn unsupported(&self, operation: &'static str) -> ApiError {
        ApiError::Unsupported {
            resource: self.name,
            operation,
        }
    }
}

/// A read-only list endpoint outside a resource's own routes.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub name: &'static str,
    pub path: &'static str,
    /// Appended after `/{id}` when the list belongs to one record.
    pub member_suffix: Option<&'static str>,
    /// snake_case key holding the list, or `None` when the body is a bare
    /// array.
    pub collection: Option<&'static str>,
    pub shape: Shape,
}

impl Listing {
    pub fn member_path(&self, id: impl fmt::Display) -> String {
        match self.member_suffix {
            Some(suffix) => format!("{}/{id}/{suffix}", self.path),
            None => format!("{}/{id}", self.path),
        }
    }
}

const START_END: &[&str] = &["start", "end"];

const MENTORSHIP: Shape = Shape {
    dates: &[],
    instants: START_END,
    nested: &[],
};

const GRADUATE: Shape = Shape {
    dates: &[],
    instants: &["graduates_at"],
    nested: &[],
};

const DATED: Shape = Shape {
    dates: START_END,
    instants: &[],
    nested: &[],
};

pub static CLIENTS: Resource = Resource {
    name: "client",
    path: "/v1/clients",
    collection: "clients",
    create_fields: Some(&["name"]),
    update_fields: Some(&["name"]),
    nested_fields: &[],
    deletable: false,
    date_fields: &[],
    shape: Shape::PLAIN,
    missing_is_none: false,
};

pub static PROJECTS: Resource = Resource {
    name: "project",
    path: "/v1/projects",
    collection: "projects",
    create_fields: Some(&["name", "client_id", "source_url"]),
    update_fields: Some(&["name", "client_id", "source_url"]),
    nested_fields: &[],
    deletable: false,
    date_fields: &[],
    shape: Shape::PLAIN,
    missing_is_none: true,
};

pub static PEOPLE: Resource = Resource {
    name: "person",
    path: "/v1/people",
    collection: "people",
    create_fields: Some(&["first_name", "last_name", "email"]),
    update_fields: Some(&["first_name", "last_name", "email"]),
    nested_fields: &[],
    deletable: false,
    date_fields: &[],
    shape: Shape::PLAIN,
    missing_is_none: false,
};

pub static EMPLOYMENTS: Resource = Resource {
    name: "employment",
    path: "/v1/employments",
    collection: "employments",
    create_fields: Some(&["start", "end", "person_id", "position_name", "position_id"]),
    update_fields: Some(&["position_id", "person_id", "start", "end"]),
    nested_fields: &[],
    deletable: false,
    date_fields: START_END,
    shape: Shape {
        dates: &[],
        instants: START_END,
        nested: &[("person", &Shape::PLAIN), ("position", &Shape::PLAIN)],
    },
    missing_is_none: true,
};

pub static ENGAGEMENTS: Resource = Resource {
    name: "engagement",
    path: "/v1/engagements",
    collection: "engagements",
    create_fields: Some(&["start", "end", "confidence_percentage", "project_id", "employment_id"]),
    update_fields: Some(&["start", "end", "confidence_percentage", "project_id", "employment_id"]),
    nested_fields: &[],
    deletable: true,
    date_fields: START_END,
    shape: Shape {
        dates: START_END,
        instants: &[],
        nested: &[("person", &Shape::PLAIN), ("project", &Shape::PLAIN)],
    },
    missing_is_none: true,
};

pub static DIRECTOR_ENGAGEMENTS: Resource = Resource {
    name: "director engagement",
    path: "/v1/director-engagements",
    collection: "director_engagements",
    create_fields: Some(&["person_id", "project_id", "start", "end"]),
    update_fields: Some(&["person_id", "project_id", "start", "end"]),
    nested_fields: &[],
    deletable: false,
    date_fields: START_END,
    shape: DATED,
    missing_is_none: false,
};

pub static LOCATIONS: Resource = Resource {
    name: "location",
    path: "/v1/locations",
    collection: "locations",
    create_fields: None,
    update_fields: None,
    nested_fields: &[],
    deletable: false,
    date_fields: &[],
    shape: Shape::PLAIN,
    missing_is_none: false,
};

pub static APPRENTICESHIPS: Resource = Resource {
    name: "apprenticeship",
    path: "/v1/apprenticeships",
    collection: "apprenticeships",
    create_fields: Some(&["person_id", "skill_level", "start", "end", "mentorships"]),
    update_fields: None,
    nested_fields: &[("mentorships", &["person_id", "start", "end"])],
    deletable: false,
    date_fields: START_END,
    shape: Shape {
        dates: &[],
        instants: START_END,
        nested: &[("mentorships", &MENTORSHIP)],
    },
    missing_is_none: false,
};

/// People currently directing a project.
pub static CURRENT_DIRECTORS: Listing = Listing {
    name: "current directors",
    path: "/v1/directors/current",
    member_suffix: None,
    collection: Some("directors"),
    shape: Shape::PLAIN,
};

/// Director engagements of one person, by person id.
pub static DIRECTOR_ENGAGEMENTS_BY_PERSON: Listing = Listing {
    name: "director engagements by person",
    path: "/v1/directors",
    member_suffix: Some("director-engagements"),
    collection: Some("director_engagements"),
    shape: DATED,
};

/// Upcoming graduations, one entry per location, each with its
/// `current_apprentices`.
pub static APPRENTICE_GRADUATIONS: Listing = Listing {
    name: "apprentice graduations",
    path: "/v1/apprenticeships/graduations",
    member_suffix: None,
    collection: None,
    shape: Shape {
        dates: &[],
        instants: &[],
        nested: &[("current_apprentices", &GRADUATE)],
    },
};
