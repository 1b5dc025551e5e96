//! HTTP plumbing for the link API.
//!
//! # Design
//! Requests and responses are plain data. `HttpClient` turns a resource path
//! and a JSON body into an `HttpRequest` and hands it to a `Transport`, the
//! only piece that touches the network. `UreqTransport` is the production
//! transport; tests swap in their own to count and stub calls.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BranchError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data. `path` is the absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data. Header names are lowercase;
/// values that are not visible ASCII are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as untyped JSON.
    pub fn json(&self) -> Result<Value, BranchError> {
        self.json_as()
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, BranchError> {
        serde_json::from_str(&self.body).map_err(|e| BranchError::Deserialization(e.to_string()))
    }
}

/// Executes an `HttpRequest`. Non-2xx statuses are returned as responses,
/// not errors; `Err` means no response was received.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BranchError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is built on first use and reused afterwards, so consecutive
/// calls share its connections.
#[derive(Default)]
pub struct UreqTransport {
    agent: OnceLock<ureq::Agent>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn agent(&self) -> &ureq::Agent {
        self.agent.get_or_init(|| {
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent()
        })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BranchError> {
        let agent = self.agent();
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let mut response = match (method, body) {
            (HttpMethod::Post, Some(body)) => {
                with_headers(agent.post(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(agent.post(&path), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(agent.put(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(agent.put(&path), &headers).send_empty(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(&path), &headers).call(),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// JSON client bound to a base URL.
#[derive(Debug)]
pub struct HttpClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn post(&self, resource: &str, body: Option<String>) -> Result<HttpResponse, BranchError> {
        self.transport.execute(self.request(HttpMethod::Post, resource, body))
    }

    pub fn put(&self, resource: &str, body: Option<String>) -> Result<HttpResponse, BranchError> {
        self.transport.execute(self.request(HttpMethod::Put, resource, body))
    }

    pub fn delete(&self, resource: &str) -> Result<HttpResponse, BranchError> {
        self.transport.execute(self.request(HttpMethod::Delete, resource, None))
    }

    /// Build the request `post`/`put`/`delete` would send, without sending it.
    pub fn request(&self, method: HttpMethod, resource: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}/{}", self.base_url, resource.trim_start_matches('/')),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.filter(|b| !b.is_empty()),
        }
    }
}
