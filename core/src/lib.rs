//! Synchronous wire-format core for the warehouse JSON API.
//!
//! # Overview
//! Translates between the application's records (snake_case keys, native
//! dates) and the service's wire format (camelCase bodies, kebab-case query
//! keys, string dates), and turns HTTP statuses into typed errors. Requests
//! and responses are plain data; the caller, or a [`Transport`], performs the
//! actual round-trip, so the core stays deterministic and free of I/O.
//!
//! # Design
//! - `case` rewrites object keys recursively and never touches values.
//! - `temporal` encodes dates and timestamps and parses them field by field.
//! - `project` keeps only the fields a caller actually set.
//! - `dispatch` routes a response to the handler registered for its status,
//!   or to the one shared fallback that raises an `ApiError`.
//! - `resource` is configuration: paths, field lists, record shapes and the
//!   operations each endpoint supports.
//! - `WarehouseClient` pairs a `build_*` with a `parse_*` per operation.

pub mod api;
pub mod case;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod project;
pub mod record;
pub mod resource;
pub mod temporal;

pub use api::{Transport, Warehouse};
pub use case::{query_pairs, to_internal_case, to_wire_case, Convention};
pub use client::WarehouseClient;
pub use dispatch::{fail_generically, Responders};
pub use error::{ApiError, Code, ErrorDescriptor, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use project::{project, project_nested, set_field};
pub use record::{Record, Value};
pub use resource::{Listing, Resource, Shape};
pub use temporal::FormatError;
