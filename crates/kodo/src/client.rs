//! Signed request dispatch
//!
//! `KodoClient` pairs a [`Transport`] with a [`Signer`]: every management
//! request gets an `Authorization` header, non-2xx responses are decoded
//! into `Error::Http`, and JSON bodies are decoded into the caller's type.

use std::sync::Arc;

use kc_core::{Result, Signer};
use serde::de::DeserializeOwned;

use crate::auth::authorization;
use crate::transport::{ByteStream, HttpRequest, HttpResponse, Transport};

/// Signing HTTP client shared by every component of the adapter
#[derive(Clone)]
pub struct KodoClient {
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
}

impl KodoClient {
    pub fn new(transport: Arc<dyn Transport>, signer: Arc<dyn Signer>) -> Self {
        Self { transport, signer }
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Attach the `Authorization` header
    fn sign(&self, request: HttpRequest) -> Result<HttpRequest> {
        let token = authorization(self.signer.as_ref(), &request)?;
        Ok(request.header("Authorization", token))
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, "received response");
        response.error_for_status()
    }

    /// Send a signed request and decode its JSON body
    pub async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let request = self.sign(request)?;
        self.dispatch(request).await?.json()
    }

    /// Send a signed request whose response body carries nothing of interest
    pub async fn request_no_response(&self, request: HttpRequest) -> Result<()> {
        let request = self.sign(request)?;
        self.dispatch(request).await?;
        Ok(())
    }

    /// Send a request without credentials and decode its JSON body
    pub async fn request_unsigned<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        self.dispatch(request).await?.json()
    }

    /// Send a signed request and hand back the body as it arrives
    pub async fn open_stream(&self, request: HttpRequest) -> Result<ByteStream> {
        let request = self.sign(request)?;
        tracing::debug!(method = %request.method, url = %request.url, "opening stream");
        self.transport.open_stream(request).await
    }
}

impl std::fmt::Debug for KodoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KodoClient")
            .field("access_key", &self.signer.access_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::transport::MockTransport;
    use kc_core::Error;

    fn client(transport: MockTransport) -> KodoClient {
        KodoClient::new(Arc::new(transport), Arc::new(Credentials::new("ak", "sk")))
    }

    #[tokio::test]
    async fn test_request_is_signed() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.headers.iter().any(|(name, value)| {
                    name == "Authorization" && value == "Qiniu ak:le2B8hy3-IGOENFFCmhrSJUAYa0="
                })
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"hash":"h","fsize":3}"#)));

        let value: serde_json::Value = client(transport)
            .request(HttpRequest::post(
                "http://rs-z0.qiniuapi.com/stat/YnVja2V0OmtleQ==",
            ))
            .await
            .unwrap();
        assert_eq!(value["fsize"], 3);
    }

    #[tokio::test]
    async fn test_unsigned_request_has_no_authorization() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.headers.is_empty())
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "[]")));

        let value: Vec<String> = client(transport)
            .request_unsigned(HttpRequest::get("http://uc.qbox.me/v2/query?ak=ak&bucket=b"))
            .await
            .unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_decoded() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(612, r#"{"error":"no such file or directory"}"#)));

        let err = client(transport)
            .request_no_response(HttpRequest::post("http://rs-z0.qiniuapi.com/delete/YTpi"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(612));
        assert!(err.to_string().contains("no such file or directory"));
    }

    #[tokio::test]
    async fn test_network_error_passes_through() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(Error::Network("connection refused".into())));

        let err = client(transport)
            .request_no_response(HttpRequest::post("http://rs-z0.qiniuapi.com/delete/YTpi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
