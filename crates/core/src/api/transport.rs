use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call against the service, relative to the versioned base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post<P: Into<String>>(path: P, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch<P: Into<String>>(path: P, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete<P: Into<String>>(path: P) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query<V: ToString>(mut self, key: &'static str, value: V) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to the service and returns the decoded JSON body.
///
/// Implementations map every non-success status to [`ApiError::Remote`].
/// Empty bodies decode to `Value::Null`.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        (**self).send(request)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let headers = auth_headers(config.client_id(), config.access_token())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: versioned_base_url(config.api_base_url(), config.api_version()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, request.path);
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &url)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            tracing::warn!(
                method = request.method.as_str(),
                path = %request.path,
                status = status.as_u16(),
                "request rejected"
            );
            return Err(ApiError::Remote {
                method: request.method.as_str(),
                path: request.path,
                status: status.as_u16(),
                message: rejection_message(&text, status.canonical_reason()),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn auth_headers(client_id: &str, access_token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let client_id = HeaderValue::from_str(client_id)
        .map_err(|_| ApiError::validation("client_id contains invalid header characters"))?;
    let mut token = HeaderValue::from_str(access_token)
        .map_err(|_| ApiError::validation("access token contains invalid header characters"))?;
    token.set_sensitive(true);
    headers.insert("X-Client-ID", client_id);
    headers.insert("X-Access-Token", token);
    Ok(headers)
}

fn versioned_base_url(base: &str, version: u32) -> String {
    format!("{}/v{}", base.trim_end_matches('/'), version)
}

/// Prefer the service's `error.message`, then the raw body, then the status reason.
fn rejection_message(body: &str, reason: Option<&str>) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    if let Some(message) = from_json {
        return message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    reason.unwrap_or("request failed").to_string()
}
