//! One ready-to-dispatch call: a route plus verb, parameters, body and timeout.

use std::time::Duration;

use serde::Serialize;

use super::endpoints::{Endpoint, Headers, Query, Route};
use super::error::NetworkError;
use super::multipart::MultipartForm;

/// Timeout applied when neither the request nor the client overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload. `None` on the request means no body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Pre-encoded JSON, sent unchanged.
    Json(Vec<u8>),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
pub struct Request {
    route: Route,
    method: Method,
    query: Query,
    headers: Headers,
    body: Option<Body>,
    timeout: Option<Duration>,
}

impl Request {
    /// A GET request for `route`, seeded with the route's own query parameters.
    pub fn new(route: impl Into<Route>) -> Self {
        let route = route.into();
        let query = route.query().unwrap_or_default();
        Self {
            route,
            method: Method::Get,
            query,
            headers: Headers::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(route: impl Into<Route>) -> Self {
        Self::new(route)
    }

    pub fn post(route: impl Into<Route>) -> Self {
        Self::new(route).method(Method::Post)
    }

    pub fn put(route: impl Into<Route>) -> Self {
        Self::new(route).method(Method::Put)
    }

    pub fn patch(route: impl Into<Route>) -> Self {
        Self::new(route).method(Method::Patch)
    }

    pub fn delete(route: impl Into<Route>) -> Self {
        Self::new(route).method(Method::Delete)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a query parameter. Caller values win over the route's on the same key.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Merge several query parameters, overriding existing keys.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Request-level header, applied over the route's headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, NetworkError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| NetworkError::InvalidRequest(format!("JSON encoding failed: {e}")))?;
        Ok(self.raw_json(bytes))
    }

    /// Use already-encoded JSON bytes as the payload.
    pub fn raw_json(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(Body::Json(bytes));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(Body::Multipart(form));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn http_method(&self) -> Method {
        self.method
    }

    pub fn query_params(&self) -> &Query {
        &self.query
    }

    pub fn extra_headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Explicit timeout, if one was set on this request.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }
}
