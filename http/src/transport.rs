//! A blocking [`Transport`] over `ureq`.

use ureq::{Agent, RequestBuilder};
use warehouse_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

use crate::config::Credentials;

/// Sends requests with a shared agent and adds default headers.
///
/// Non-2xx statuses come back as responses so the core dispatcher sees them.
#[derive(Debug, Clone)]
pub struct TokenTransport {
    agent: Agent,
    defaults: Vec<(String, String)>,
}

impl TokenTransport {
    pub fn new(credentials: Option<&Credentials>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let defaults = credentials
            .map(|c| vec![("authorization".to_string(), c.header_value())])
            .unwrap_or_default();
        Self { agent, defaults }
    }

    /// Adds a default header, replacing any earlier default with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.defaults.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.defaults.push((name, value.into()));
        self
    }

    /// Defaults first, minus any the request sets itself.
    fn headers(&self, request: &HttpRequest) -> Vec<(String, String)> {
        self.defaults
            .iter()
            .filter(|(name, _)| request.header(name).is_none())
            .chain(request.headers.iter())
            .cloned()
            .collect()
    }
}

fn prepare<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)], query: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    for (key, value) in query {
        builder = builder.query(key, value);
    }
    builder
}

impl Transport for TokenTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let headers = self.headers(&request);
        let url = request.path.as_str();
        let query = request.query.as_slice();
        tracing::debug!(method = %request.method, %url, "sending request");

        let result = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), &headers, query).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), &headers, query).call(),
            HttpMethod::Post => {
                let builder = prepare(self.agent.post(url), &headers, query);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = prepare(self.agent.put(url), &headers, query);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::debug!(status, %url, "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_core::{record, resource::PROJECTS, WarehouseClient};

    fn request() -> HttpRequest {
        WarehouseClient::new("http://h").build_find_all(&PROJECTS, &record! {})
    }

    #[test]
    fn no_credentials_adds_nothing() {
        let transport = TokenTransport::new(None);
        assert_eq!(transport.headers(&request()), request().headers);
    }

    #[test]
    fn credentials_add_authorization() {
        let transport = TokenTransport::new(Some(&Credentials::IdToken("abc".into())));
        let headers = transport.headers(&request());
        assert_eq!(headers[0], ("authorization".to_string(), "Token abc".to_string()));
    }

    #[test]
    fn request_headers_override_defaults() {
        let transport = TokenTransport::new(Some(&Credentials::IdToken("abc".into())));
        let mut req = request();
        req.headers.push(("Authorization".into(), "Bearer xyz".into()));

        let headers = transport.headers(&req);
        let auth: Vec<_> = headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth, [&("Authorization".to_string(), "Bearer xyz".to_string())]);
    }

    #[test]
    fn with_header_replaces_same_name() {
        let transport = TokenTransport::new(Some(&Credentials::IdToken("abc".into())))
            .with_header("Authorization", "Bearer other")
            .with_header("x-request-id", "1");
        assert_eq!(
            transport.defaults,
            vec![
                ("Authorization".to_string(), "Bearer other".to_string()),
                ("x-request-id".to_string(), "1".to_string()),
            ]
        );
    }
}
