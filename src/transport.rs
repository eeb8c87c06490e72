//! Pluggable HTTP transport and the reqwest-backed default.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use crate::error::Result;

/// A file attached to a write request, sent as a multipart part.
#[derive(Debug, Clone)]
pub struct FileUpload {
  pub file_name: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

/// Body of an outgoing request.
#[derive(Debug, Clone)]
pub enum RequestBody {
  Json(Value),
  /// JSON payload as one part (`payload`) and the file as another (`file`).
  Multipart { payload: Value, file: FileUpload },
}

/// One outgoing API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: Method,
  pub url: String,
  pub body: Option<RequestBody>,
}

impl ApiRequest {
  pub fn get(url: impl Into<String>) -> Self {
    Self {
      method: Method::GET,
      url: url.into(),
      body: None,
    }
  }

  pub fn with_body(method: Method, url: impl Into<String>, body: RequestBody) -> Self {
    Self {
      method,
      url: url.into(),
      body: Some(body),
    }
  }
}

/// Transport-level response: status plus the raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl HttpResponse {
  pub fn ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
    Ok(serde_json::from_slice(&self.body)?)
  }
}

/// Narrow contract for issuing HTTP requests; swap in a fake for tests or a
/// different client altogether.
#[async_trait]
pub trait HttpTransport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<HttpResponse>;
}

/// Supplies the bearer token attached to every request. The credential store
/// itself (cookies, keychain, env) lives outside this crate.
pub trait TokenProvider: Send + Sync {
  fn bearer_token(&self) -> Option<String>;
}

/// Reads the token from an environment variable.
pub struct EnvToken {
  variable: String,
}

impl EnvToken {
  pub fn new(variable: impl Into<String>) -> Self {
    Self {
      variable: variable.into(),
    }
  }
}

impl TokenProvider for EnvToken {
  fn bearer_token(&self) -> Option<String> {
    std::env::var(&self.variable).ok()
  }
}

/// A fixed token, mostly for tests and short-lived tools.
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
  fn bearer_token(&self) -> Option<String> {
    Some(self.0.clone())
  }
}

/// Anonymous access.
pub struct NoToken;

impl TokenProvider for NoToken {
  fn bearer_token(&self) -> Option<String> {
    None
  }
}

/// Default transport over reqwest. Attaches the bearer token on every call
/// and disables intermediary caching; the resource cache is the only cache.
pub struct ReqwestTransport {
  client: reqwest::Client,
  token: Arc<dyn TokenProvider>,
}

impl ReqwestTransport {
  pub fn new(token: Arc<dyn TokenProvider>) -> Self {
    Self {
      client: reqwest::Client::new(),
      token,
    }
  }

  fn headers(&self) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if let Some(token) = self.token.bearer_token() {
      if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
        headers.insert(AUTHORIZATION, value);
      }
    }

    headers
  }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
  async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
    trace!(method = %request.method, url = %request.url, "sending request");

    let mut builder = self
      .client
      .request(request.method, &request.url)
      .headers(self.headers());

    builder = match request.body {
      None => builder,
      Some(RequestBody::Json(json)) => builder.json(&json),
      Some(RequestBody::Multipart { payload, file }) => {
        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
          part = part
            .mime_str(&content_type)
            .map_err(crate::error::Error::Transport)?;
        }

        let form = reqwest::multipart::Form::new()
          .text("payload", payload.to_string())
          .part("file", part);
        builder.multipart(form)
      }
    };

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse { status, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_response_ok_range() {
    let ok = HttpResponse {
      status: 204,
      body: Vec::new(),
    };
    let not_ok = HttpResponse {
      status: 404,
      body: Vec::new(),
    };
    assert!(ok.ok());
    assert!(!not_ok.ok());
  }

  #[test]
  fn test_response_json() {
    let response = HttpResponse {
      status: 200,
      body: br#"{"data": null}"#.to_vec(),
    };
    let value: serde_json::Value = response.json().unwrap();
    assert!(value["data"].is_null());
  }

  #[test]
  fn test_static_token() {
    assert_eq!(StaticToken("abc".into()).bearer_token().as_deref(), Some("abc"));
    assert_eq!(NoToken.bearer_token(), None);
  }
}
