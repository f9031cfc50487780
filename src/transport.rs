//! HTTP transport seam
//!
//! Handlers describe requests as [`RequestSpec`] values and hand them to an
//! [`HttpTransport`]. The production transport is blocking `ureq`; tests swap
//! in an in-memory recorder.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;

/// Largest response body accepted (document downloads included)
const MAX_BODY_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// How the response body should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    #[default]
    Json,
    Binary,
}

/// One outbound request, built fresh per call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub response_mode: ResponseMode,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            query: Vec::new(),
            response_mode: ResponseMode::Json,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.header("Content-Type", "application/json")
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn binary(mut self) -> Self {
        self.response_mode = ResponseMode::Binary;
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response, whatever its status
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; `None` when the body is blank
    pub fn json(&self) -> Option<Result<Value, serde_json::Error>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(serde_json::from_slice(&self.body))
    }
}

/// Sends requests. Non-2xx statuses come back as `Ok`; only failures to get
/// any response at all are errors.
pub trait HttpTransport {
    fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport over a shared `ureq` agent
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .into();
        Self { agent }
    }

    fn prepare<B>(mut builder: RequestBuilder<B>, request: &RequestSpec) -> RequestBuilder<B> {
        if request.header_value("Accept").is_none() {
            let accept = match request.response_mode {
                ResponseMode::Json => "application/json",
                ResponseMode::Binary => "*/*",
            };
            builder = builder.header("Accept", accept);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (name, value) in &request.query {
            builder = builder.query(name, value);
        }
        builder
    }

    fn without_body(
        builder: RequestBuilder<WithoutBody>,
        request: &RequestSpec,
        body: Option<Vec<u8>>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = Self::prepare(builder, request);
        match body {
            Some(bytes) => builder.force_send_body().send(&bytes[..]),
            None => builder.call(),
        }
    }

    fn with_body(
        builder: RequestBuilder<WithBody>,
        request: &RequestSpec,
        body: Option<Vec<u8>>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = Self::prepare(builder, request);
        match body {
            Some(bytes) => builder.send(&bytes[..]),
            None => builder.send_empty(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError> {
        let body = match &request.body {
            Some(value) => Some(serde_json::to_vec(value).map_err(|e| TransportError::Encode(e.to_string()))?),
            None => None,
        };

        log::debug!("{} {}", request.method, request.url);

        let url = request.url.as_str();
        let result = match request.method {
            Method::Get => Self::without_body(self.agent.get(url), request, body),
            Method::Delete => Self::without_body(self.agent.delete(url), request, body),
            Method::Post => Self::with_body(self.agent.post(url), request, body),
            Method::Put => Self::with_body(self.agent.put(url), request, body),
            Method::Patch => Self::with_body(self.agent.patch(url), request, body),
        };

        let mut response = result.map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?;

        log::debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory transport that records requests and replays canned responses

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct RecordingTransport {
        pub requests: RefCell<Vec<RequestSpec>>,
        responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_json(&self, status: u16, body: Value) -> &Self {
            self.push(Ok(HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: serde_json::to_vec(&body).unwrap(),
            }))
        }

        pub fn push_empty(&self, status: u16) -> &Self {
            self.push(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: Vec::new(),
            }))
        }

        pub fn push_bytes(&self, status: u16, headers: &[(&str, &str)], body: &[u8]) -> &Self {
            self.push(Ok(HttpResponse {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                    .collect(),
                body: body.to_vec(),
            }))
        }

        pub fn push_network_error(&self, message: &str) -> &Self {
            self.push(Err(TransportError::Network(message.to_string())))
        }

        pub fn push(&self, response: Result<HttpResponse, TransportError>) -> &Self {
            self.responses.borrow_mut().push_back(response);
            self
        }

        pub fn request(&self, index: usize) -> RequestSpec {
            self.requests.borrow()[index].clone()
        }

        pub fn count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl HttpTransport for RecordingTransport {
        fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
                Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: b"{}".to_vec(),
                })
            })
        }
    }
}
