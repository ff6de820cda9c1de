//! Stateless HTTP request builder and response parser for the warehouse API.
//!
//! # Design
//! `WarehouseClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Which fields go out and how records come back is read from
//! the [`Resource`] passed in.
//!
//! Outgoing bodies run project -> date fields -> JSON -> camelCase. A
//! resource without a create, update or delete endpoint fails with
//! `ApiError::Unsupported` before any request exists. Incoming
//! bodies run JSON -> snake_case -> temporal fields, inside the handler the
//! dispatcher picks for the status.

use std::fmt;

use serde_json::Value as Json;
use tracing::debug;

use crate::case::{query_pairs, to_internal_case, to_wire_case, Convention};
use crate::dispatch::Responders;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::project::project_nested;
use crate::record::{Record, Value};
use crate::resource::{Listing, Resource, Shape};

const JSON: &str = "application/json";

/// Synchronous, stateless client for the warehouse API.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    base_url: String,
}

impl WarehouseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_find_all(&self, resource: &Resource, filters: &Record) -> HttpRequest {
        self.get(resource.path.to_string(), query_pairs(filters))
    }

    pub fn parse_find_all(&self, resource: &Resource, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        Responders::new()
            .on(200, |r: &HttpResponse| decode_collection(resource, r))
            .dispatch(response)
    }

    pub fn build_find_by_id(&self, resource: &Resource, id: impl fmt::Display) -> HttpRequest {
        self.get(resource.member_path(id), Vec::new())
    }

    /// `Ok(None)` only for resources where a 404 means "missing"; elsewhere a
    /// 404 is `ApiError::NotFound`.
    pub fn parse_find_by_id(&self, resource: &Resource, response: HttpResponse) -> Result<Option<Record>, ApiError> {
        let responders = Responders::new().on(200, |r: &HttpResponse| decode_member(resource, r).map(Some));
        let responders = if resource.missing_is_none {
            responders.on(404, |_| Ok(None))
        } else {
            responders
        };
        responders.dispatch(response)
    }

    pub fn build_search(&self, resource: &Resource, criteria: &Record) -> HttpRequest {
        self.get(format!("{}/search", resource.path), query_pairs(criteria))
    }

    pub fn parse_search(&self, resource: &Resource, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        self.parse_find_all(resource, response)
    }

    pub fn build_create(&self, resource: &Resource, data: &Record) -> Result<HttpRequest, ApiError> {
        let body = encode_body(data, resource.fields_for_create()?, resource.nested_fields, resource.date_fields)?;
        debug!(resource = resource.name, "building create request");
        Ok(self.with_body(HttpMethod::Post, resource.path.to_string(), body))
    }

    pub fn parse_create(&self, resource: &Resource, response: HttpResponse) -> Result<Record, ApiError> {
        Responders::new()
            .on(201, |r: &HttpResponse| decode_member(resource, r))
            .dispatch(response)
    }

    /// Only fields present in `data` are sent, so omitted fields keep their
    /// server-side values.
    pub fn build_update(&self, resource: &Resource, id: impl fmt::Display, data: &Record) -> Result<HttpRequest, ApiError> {
        let body = encode_body(data, resource.fields_for_update()?, resource.nested_fields, resource.date_fields)?;
        debug!(resource = resource.name, "building update request");
        Ok(self.with_body(HttpMethod::Put, resource.member_path(id), body))
    }

    pub fn parse_update(&self, _resource: &Resource, response: HttpResponse) -> Result<(), ApiError> {
        Responders::new()
            .on(200, |_| Ok(()))
            .on(204, |_| Ok(()))
            .dispatch(response)
    }

    pub fn build_delete(&self, resource: &Resource, id: impl fmt::Display) -> Result<HttpRequest, ApiError> {
        resource.check_deletable()?;
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(&resource.member_path(id)),
            query: Vec::new(),
            headers: vec![accept()],
            body: None,
        })
    }

    pub fn parse_delete(&self, _resource: &Resource, response: HttpResponse) -> Result<(), ApiError> {
        Responders::new()
            .on(200, |_| Ok(()))
            .on(204, |_| Ok(()))
            .dispatch(response)
    }

    pub fn build_list(&self, listing: &Listing) -> HttpRequest {
        self.get(listing.path.to_string(), Vec::new())
    }

    /// The list that belongs to the record `id`, such as one person's
    /// director engagements.
    pub fn build_list_for(&self, listing: &Listing, id: impl fmt::Display) -> HttpRequest {
        self.get(listing.member_path(id), Vec::new())
    }

    pub fn parse_list(&self, listing: &Listing, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        Responders::new()
            .on(200, |r: &HttpResponse| decode_list(listing.collection, &listing.shape, r))
            .dispatch(response)
    }

    fn get(&self, path: String, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&path),
            query,
            headers: vec![accept()],
            body: None,
        }
    }

    fn with_body(&self, method: HttpMethod, path: String, body: String) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(&path),
            query: Vec::new(),
            headers: vec![accept(), ("content-type".to_string(), JSON.to_string())],
            body: Some(body),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn accept() -> (String, String) {
    ("accept".to_string(), JSON.to_string())
}

/// Builds the wire body for a create or update.
///
/// Keeps only `allowed` fields the caller set, and inside each `nested` field
/// only that field's allowed keys. Writes `date_fields` as `YYYY-MM-DD` at
/// any depth, and camelCases every key.
pub fn encode_body(
    data: &Record,
    allowed: &[&str],
    nested: &[(&str, &[&str])],
    date_fields: &[&str],
) -> Result<String, ApiError> {
    let projected = project_nested(data, allowed, nested);
    let dated = dates_for_wire(Value::Record(projected), date_fields);
    let wire = to_wire_case(&dated.to_json(), Convention::Camel);
    serde_json::to_string(&wire).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn dates_for_wire(value: Value, date_fields: &[&str]) -> Value {
    match value {
        Value::Record(record) => Value::Record(
            record
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::Instant(instant) if date_fields.contains(&key.as_str()) => {
                            Value::Date(instant.date_naive())
                        }
                        other => dates_for_wire(other, date_fields),
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::List(items) => Value::List(items.into_iter().map(|item| dates_for_wire(item, date_fields)).collect()),
        other => other,
    }
}

fn decode_json(response: &HttpResponse) -> Result<Json, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn decode_member(resource: &Resource, response: &HttpResponse) -> Result<Record, ApiError> {
    resource.shape.decode(&decode_json(response)?)
}

fn decode_collection(resource: &Resource, response: &HttpResponse) -> Result<Vec<Record>, ApiError> {
    decode_list(Some(resource.collection), &resource.shape, response)
}

/// Decodes the list under `collection`, or the whole body when there is no
/// collection key.
fn decode_list(collection: Option<&str>, shape: &Shape, response: &HttpResponse) -> Result<Vec<Record>, ApiError> {
    let body = to_internal_case(&decode_json(response)?);
    let items = match collection {
        Some(key) => body.get(key),
        None => Some(&body),
    }
    .and_then(Json::as_array)
    .ok_or_else(|| match collection {
        Some(key) => ApiError::Deserialization(format!("response has no `{key}` list")),
        None => ApiError::Deserialization("expected a list body".to_string()),
    })?;
    items.iter().map(|item| shape.decode(item)).collect()
}
