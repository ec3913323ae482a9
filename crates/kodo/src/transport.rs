//! HTTP transport seam
//!
//! Everything above this module talks to the service through the
//! [`Transport`] trait, so request building, signing and decoding can be
//! exercised without a network.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use kc_core::{Error, Result, TimeoutConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Response body delivered chunk by chunk
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Request body with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: String,
    pub data: Bytes,
}

/// A fully built request, ready to be signed and sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    /// Attach an already encoded form body
    pub fn form(self, encoded: impl Into<String>) -> Self {
        self.body(FORM_CONTENT_TYPE, encoded.into())
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let data = serde_json::to_vec(value)?;
        Ok(self.body(JSON_CONTENT_TYPE, data))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.body.as_ref().map(|b| b.content_type.as_str())
    }
}

/// Status and fully read body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`Error::Http`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(response_error(self.status, &self.body))
        }
    }

    /// Decode the body as JSON; an empty body decodes as `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("invalid response body: {e}")))
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// Build an error from a non-2xx status and its body
///
/// The service answers with `{"error": "..."}`; anything else is reported
/// as raw text, or as the status reason when the body is empty.
pub fn response_error(status: u16, body: &[u8]) -> Error {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            }
        }
    };
    Error::Http { status, message }
}

/// Sends signed requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the whole response, whatever its status
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Send a request and hand back the body as it arrives
    ///
    /// Non-2xx responses are read in full and returned as errors.
    async fn open_stream(&self, request: HttpRequest) -> Result<ByteStream>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: &TimeoutConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(timeout.connect_ms))
            .read_timeout(Duration::from_millis(timeout.read_ms))
            .user_agent(concat!("kc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn execute(&self, request: HttpRequest) -> Result<reqwest::Response> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, body.content_type).body(body.data);
        }

        builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.execute(request).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;
        Ok(HttpResponse { status, body })
    }

    async fn open_stream(&self, request: HttpRequest) -> Result<ByteStream> {
        let response = self.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(response_error(status.as_u16(), &body));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")));
        Ok(stream.boxed())
    }
}
