//! Connection settings read from the environment.

use thiserror::Error;

pub const HOST_VAR: &str = "WAREHOUSE_HOST";
pub const ID_TOKEN_VAR: &str = "WAREHOUSE_ID_TOKEN";
pub const ACCESS_TOKEN_VAR: &str = "WAREHOUSE_ACCESS_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{HOST_VAR} is not set")]
    MissingHost,
}

/// How requests authenticate against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    IdToken(String),
    AccessToken(String),
}

impl Credentials {
    /// The `Authorization` header value for these credentials.
    pub fn header_value(&self) -> String {
        match self {
            Credentials::IdToken(token) => format!("Token {token}"),
            Credentials::AccessToken(token) => format!("Bearer {token}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub credentials: Option<Credentials>,
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. An id token takes
    /// precedence over an access token; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let host = var(HOST_VAR).ok_or(ConfigError::MissingHost)?;
        let credentials = var(ID_TOKEN_VAR)
            .map(Credentials::IdToken)
            .or_else(|| var(ACCESS_TOKEN_VAR).map(Credentials::AccessToken));

        Ok(Self { host, credentials })
    }
}
