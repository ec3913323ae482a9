//! Request and URL signing
//!
//! Kodo signs with HMAC-SHA1 over a canonical string and encodes the digest
//! as URL-safe base64. Management requests carry the result in an
//! `Authorization: Qiniu <access_key>:<signature>` header.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use hmac::{Hmac, Mac};
use kc_core::{Alias, Error, Result, Signer};
use sha1::Sha1;
use url::Url;

use crate::transport::HttpRequest;

type HmacSha1 = Hmac<Sha1>;

/// Body content type that is never part of the signed data
const OCTET_STREAM: &str = "application/octet-stream";

/// Access key / secret key pair
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn from_alias(alias: &Alias) -> Self {
        Self::new(&alias.access_key, &alias.secret_key)
    }

    fn digest(&self, data: &[u8]) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| Error::General(format!("invalid secret key: {e}")))?;
        mac.update(data);
        Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Signer for Credentials {
    fn access_key(&self) -> &str {
        &self.access_key
    }

    fn sign(&self, data: &[u8]) -> Result<String> {
        Ok(format!("{}:{}", self.access_key, self.digest(data)?))
    }
}

/// Canonical string signed for a management request
///
/// `<METHOD> <path>[?<query>]\nHost: <host>[\nContent-Type: <type>]\n\n`
/// followed by the body, unless the body is binary.
pub fn signing_data(request: &HttpRequest) -> Result<Vec<u8>> {
    let url = Url::parse(&request.url)?;

    let mut data = format!("{} {}", request.method.as_str(), url.path());
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        data.push('?');
        data.push_str(query);
    }

    data.push_str("\nHost: ");
    data.push_str(url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        data.push(':');
        data.push_str(&port.to_string());
    }

    let content_type = request.content_type().filter(|ct| !ct.is_empty());
    if let Some(ct) = content_type {
        data.push_str("\nContent-Type: ");
        data.push_str(ct);
    }
    data.push_str("\n\n");

    let mut data = data.into_bytes();
    match (content_type, request.body.as_ref()) {
        (Some(ct), Some(body)) if ct != OCTET_STREAM => data.extend_from_slice(&body.data),
        _ => {}
    }
    Ok(data)
}

/// Value of the `Authorization` header for `request`
pub fn authorization(signer: &dyn Signer, request: &HttpRequest) -> Result<String> {
    let data = signing_data(request)?;
    Ok(format!("Qiniu {}", signer.sign(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_vector() {
        let credentials = Credentials::new("ak", "key");
        assert_eq!(
            credentials
                .sign(b"The quick brown fox jumps over the lazy dog")
                .unwrap(),
            "ak:3nybhbi3iqa8ino29wqQcBydtNk="
        );
    }

    #[test]
    fn test_sign_accepts_any_key_length() {
        let long = "k".repeat(200);
        for secret in ["", "short", long.as_str()] {
            let token = Credentials::new("ak", secret).sign(b"data").unwrap();
            assert!(token.starts_with("ak:"));
            assert_eq!(token.len(), "ak:".len() + 28);
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let credentials = Credentials::new("ak", "very-secret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("ak"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_signing_data_without_body() {
        let request = HttpRequest::post("http://rs-z0.qiniuapi.com/stat/YnVja2V0OmtleQ==");
        let data = String::from_utf8(signing_data(&request).unwrap()).unwrap();
        assert!(data.ends_with("\n\n"));
        insta::assert_snapshot!(data.trim_end(), @r"
        POST /stat/YnVja2V0OmtleQ==
        Host: rs-z0.qiniuapi.com
        ");
    }

    #[test]
    fn test_signing_data_with_form_body() {
        let request =
            HttpRequest::post("https://rs.qiniu.com:8443/batch?x=1").form("op=%2Fstat%2FYTpi");
        let data = String::from_utf8(signing_data(&request).unwrap()).unwrap();
        assert_eq!(
            data,
            "POST /batch?x=1\nHost: rs.qiniu.com:8443\n\
             Content-Type: application/x-www-form-urlencoded\n\nop=%2Fstat%2FYTpi"
        );
    }

    #[test]
    fn test_signing_data_skips_binary_body() {
        let request = HttpRequest::post("http://io.example.com/put").body(OCTET_STREAM, "raw");
        let data = String::from_utf8(signing_data(&request).unwrap()).unwrap();
        assert!(data.ends_with("Content-Type: application/octet-stream\n\n"));
    }

    #[test]
    fn test_authorization_header() {
        let credentials = Credentials::new("ak", "sk");
        let request = HttpRequest::post("http://rs-z0.qiniuapi.com/stat/YnVja2V0OmtleQ==");
        assert_eq!(
            authorization(&credentials, &request).unwrap(),
            "Qiniu ak:le2B8hy3-IGOENFFCmhrSJUAYa0="
        );

        let request = HttpRequest::post("http://rs.qiniu.com/batch").form("op=%2Fstat%2FYTpi");
        assert_eq!(
            authorization(&credentials, &request).unwrap(),
            "Qiniu ak:CG3_6wF9SO1YksUU03p1cfZN4X0="
        );
    }

    #[test]
    fn test_signing_data_rejects_bad_url() {
        let request = HttpRequest::post("not a url");
        assert!(signing_data(&request).is_err());
    }
}
