//! The transport seam and a facade that runs build -> send -> parse.
//!
//! The core never does I/O itself. Anything that can turn an `HttpRequest`
//! into an `HttpResponse` implements [`Transport`]; `Warehouse` pairs one
//! with a `WarehouseClient`. Each call is one independent round-trip.

use std::fmt;

use crate::client::WarehouseClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::record::Record;
use crate::resource::{Listing, Resource};

/// Executes a request and returns the raw envelope.
///
/// Implementations report 4xx/5xx as an `HttpResponse`, not as an error;
/// `Err` is for failures to get a response at all.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// A client bound to a transport.
#[derive(Debug, Clone)]
pub struct Warehouse<T> {
    client: WarehouseClient,
    transport: T,
}

impl<T: Transport> Warehouse<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: WarehouseClient::new(base_url),
            transport,
        }
    }

    pub fn find_all(&self, resource: &Resource, filters: &Record) -> Result<Vec<Record>, ApiError> {
        let response = self.transport.send(self.client.build_find_all(resource, filters))?;
        self.client.parse_find_all(resource, response)
    }

    pub fn find_by_id(&self, resource: &Resource, id: impl fmt::Display) -> Result<Option<Record>, ApiError> {
        let response = self.transport.send(self.client.build_find_by_id(resource, id))?;
        self.client.parse_find_by_id(resource, response)
    }

    pub fn search(&self, resource: &Resource, criteria: &Record) -> Result<Vec<Record>, ApiError> {
        let response = self.transport.send(self.client.build_search(resource, criteria))?;
        self.client.parse_search(resource, response)
    }

    pub fn create(&self, resource: &Resource, data: &Record) -> Result<Record, ApiError> {
        let response = self.transport.send(self.client.build_create(resource, data)?)?;
        self.client.parse_create(resource, response)
    }

    pub fn update(&self, resource: &Resource, id: impl fmt::Display, data: &Record) -> Result<(), ApiError> {
        let response = self.transport.send(self.client.build_update(resource, id, data)?)?;
        self.client.parse_update(resource, response)
    }

    pub fn delete(&self, resource: &Resource, id: impl fmt::Display) -> Result<(), ApiError> {
        let response = self.transport.send(self.client.build_delete(resource, id)?)?;
        self.client.parse_delete(resource, response)
    }

    pub fn list(&self, listing: &Listing) -> Result<Vec<Record>, ApiError> {
        let response = self.transport.send(self.client.build_list(listing))?;
        self.client.parse_list(listing, response)
    }

    pub fn list_for(&self, listing: &Listing, id: impl fmt::Display) -> Result<Vec<Record>, ApiError> {
        let response = self.transport.send(self.client.build_list_for(listing, id))?;
        self.client.parse_list(listing, response)
    }
}
