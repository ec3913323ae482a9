//! Download URLs
//!
//! Public URLs are `domain/key`. Private URLs append an absolute expiry
//! `e=<deadline>`, sign the resulting string byte for byte, then append
//! `&token=<signature>`. Nothing may touch the URL after signing, so every
//! URL is already in the escaped form a client puts on the wire.

use kc_core::{Result, Signer};
use url::{ParseError, Url};

use crate::uri::{encode_query, query_escape};

/// Escape a key or raw query the way the download service canonicalizes it
///
/// Query-escape, then restore `/` and `|`, and spell spaces as `%20`.
pub fn url_encode_query(s: &str) -> String {
    query_escape(s)
        .replace("%2F", "/")
        .replace("%7C", "|")
        .replace('+', "%20")
}

/// Epoch seconds `ttl_secs` from now
pub fn deadline_after(ttl_secs: i64) -> i64 {
    jiff::Timestamp::now().as_second().saturating_add(ttl_secs)
}

fn base(domain: &str) -> &str {
    domain.trim_end_matches('/')
}

/// Escape the path of `raw` the way an HTTP client sends it
///
/// Bytes outside the URL path set become `%XX`; `/` and existing escapes
/// are kept. A domain without a scheme is escaped as a bare path.
fn normalize(raw: &str) -> Result<String> {
    match Url::parse(raw) {
        Ok(url) => Ok(url.into()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let mut url = Url::parse("http://localhost/")?;
            url.set_path(raw);
            let path = url.path();
            let path = if raw.starts_with('/') {
                path
            } else {
                path.strip_prefix('/').unwrap_or(path)
            };
            Ok(path.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// `domain/key` with the key taken as an already-formed path
///
/// Unlike [`make_public_url_v2`], `/`, `%XX` and the other legal path
/// characters are left alone; only what a client would escape is escaped.
pub fn make_public_url(domain: &str, key: &str) -> Result<String> {
    normalize(&format!("{}/{key}", base(domain)))
}

fn public_url_with_raw_query(domain: &str, key: &str, raw_query: &str) -> String {
    let mut url = format!("{}/{}", base(domain), url_encode_query(key));
    if !raw_query.is_empty() {
        url.push('?');
        url.push_str(raw_query);
    }
    url
}

/// `domain/key` with the key escaped
pub fn make_public_url_v2(domain: &str, key: &str) -> String {
    public_url_with_raw_query(domain, key, "")
}

/// Escaped key plus query parameters, encoded and sorted by name
pub fn make_public_url_v2_with_query(domain: &str, key: &str, query: &[(&str, &str)]) -> String {
    public_url_with_raw_query(domain, key, &encode_query(query))
}

/// Escaped key plus a raw query string such as an image-processing command
pub fn make_public_url_v2_with_query_string(domain: &str, key: &str, query: &str) -> String {
    public_url_with_raw_query(domain, key, &url_encode_query(query))
}

fn sign_url(signer: &dyn Signer, public_url: String, deadline: i64) -> Result<String> {
    let separator = if public_url.contains('?') { '&' } else { '?' };
    let url_to_sign = format!("{public_url}{separator}e={deadline}");
    let token = signer.sign(url_to_sign.as_bytes())?;
    Ok(format!("{url_to_sign}&token={token}"))
}

/// Private URL over [`make_public_url`]
pub fn make_private_url(
    signer: &dyn Signer,
    domain: &str,
    key: &str,
    deadline: i64,
) -> Result<String> {
    sign_url(signer, make_public_url(domain, key)?, deadline)
}

pub fn make_private_url_v2(
    signer: &dyn Signer,
    domain: &str,
    key: &str,
    deadline: i64,
) -> Result<String> {
    sign_url(signer, make_public_url_v2(domain, key), deadline)
}

pub fn make_private_url_v2_with_query(
    signer: &dyn Signer,
    domain: &str,
    key: &str,
    query: &[(&str, &str)],
    deadline: i64,
) -> Result<String> {
    sign_url(
        signer,
        make_public_url_v2_with_query(domain, key, query),
        deadline,
    )
}

pub fn make_private_url_v2_with_query_string(
    signer: &dyn Signer,
    domain: &str,
    key: &str,
    query: &str,
    deadline: i64,
) -> Result<String> {
    sign_url(
        signer,
        make_public_url_v2_with_query_string(domain, key, query),
        deadline,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn token_of(url: &str) -> &str {
        url.rsplit_once("&token=").map(|(_, t)| t).unwrap_or_default()
    }

    #[test]
    fn test_url_encode_query() {
        assert_eq!(url_encode_query("a b/c|d+e"), "a%20b/c|d%2Be");
        assert_eq!(url_encode_query("中文.jpg"), "%E4%B8%AD%E6%96%87.jpg");
        assert_eq!(url_encode_query("x=1&y=2"), "x%3D1%26y%3D2");
    }

    #[test]
    fn test_public_url_escapes_like_a_client() {
        assert_eq!(
            make_public_url("http://cdn.example.com/", "dir/my file.txt").unwrap(),
            "http://cdn.example.com/dir/my%20file.txt"
        );
        assert_eq!(
            make_public_url("http://cdn.example.com", "中文.jpg").unwrap(),
            "http://cdn.example.com/%E4%B8%AD%E6%96%87.jpg"
        );
        // escapes and legal path characters are kept
        assert_eq!(
            make_public_url("http://cdn.example.com", "a%20b/c+d=e@f").unwrap(),
            "http://cdn.example.com/a%20b/c+d=e@f"
        );
        assert_eq!(
            make_public_url("cdn.example.com", "dir/my file.txt").unwrap(),
            "cdn.example.com/dir/my%20file.txt"
        );
        assert!(make_public_url("http://exa mple.com", "a.txt").is_err());
    }

    #[test]
    fn test_public_urls_v2() {
        assert_eq!(
            make_public_url_v2("http://cdn.example.com", "dir/my file.txt"),
            "http://cdn.example.com/dir/my%20file.txt"
        );
        assert_eq!(
            make_public_url_v2_with_query(
                "http://cdn.example.com",
                "a.txt",
                &[("v", "2"), ("attname", "report 1.txt")]
            ),
            "http://cdn.example.com/a.txt?attname=report+1.txt&v=2"
        );
        assert_eq!(
            make_public_url_v2_with_query_string(
                "http://cdn.example.com",
                "a.jpg",
                "imageView2/1/w/200"
            ),
            "http://cdn.example.com/a.jpg?imageView2/1/w/200"
        );
    }

    #[test]
    fn test_private_url_deadline_and_token() {
        let credentials = Credentials::new("ak", "sk");
        let url =
            make_private_url(&credentials, "cdn.example.com", "a.txt", 1_700_000_000).unwrap();

        assert!(url.starts_with("cdn.example.com/a.txt?e=1700000000&token="));
        assert!(!token_of(&url).is_empty());

        let later =
            make_private_url(&credentials, "cdn.example.com", "a.txt", 1_700_000_001).unwrap();
        assert_ne!(token_of(&url), token_of(&later));
    }

    #[test]
    fn test_private_url_signs_exact_string() {
        let credentials = Credentials::new("ak", "sk");
        let url = make_private_url(
            &credentials,
            "http://cdn.example.com",
            "a.txt",
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(
            url,
            "http://cdn.example.com/a.txt?e=1700000000&token=ak:wU8qgMwgEE3OtDAy9VzKxWDAjOk="
        );
    }

    #[test]
    fn test_private_url_signs_escaped_key() {
        let credentials = Credentials::new("ak", "sk");
        let url = make_private_url(
            &credentials,
            "http://cdn.example.com",
            "dir/my file.txt",
            1_700_000_000,
        )
        .unwrap();
        assert!(!url.contains(' '));

        let (signed, token) = url.rsplit_once("&token=").unwrap();
        assert_eq!(signed, "http://cdn.example.com/dir/my%20file.txt?e=1700000000");
        assert_eq!(token, credentials.sign(signed.as_bytes()).unwrap());

        let v2 = make_private_url_v2(
            &credentials,
            "http://cdn.example.com",
            "dir/my file.txt",
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(url, v2);
    }

    #[test]
    fn test_private_url_with_existing_query() {
        let credentials = Credentials::new("ak", "sk");
        let url = make_private_url_v2_with_query_string(
            &credentials,
            "http://cdn.example.com",
            "dir/my file.txt",
            "imageView2/1/w/200",
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(
            url,
            "http://cdn.example.com/dir/my%20file.txt?imageView2/1/w/200&e=1700000000\
             &token=ak:QhtXWZYWQEvw20-NsPphq54ms1w="
        );

        let url = make_private_url_v2_with_query(
            &credentials,
            "http://cdn.example.com",
            "a.txt",
            &[("v", "2")],
            42,
        )
        .unwrap();
        assert!(url.starts_with("http://cdn.example.com/a.txt?v=2&e=42&token=ak:"));

        let url = make_private_url_v2(&credentials, "http://cdn.example.com", "a b", 42).unwrap();
        assert!(url.starts_with("http://cdn.example.com/a%20b?e=42&token=ak:"));
    }

    #[test]
    fn test_deadline_after() {
        let now = jiff::Timestamp::now().as_second();
        let deadline = deadline_after(3600);
        assert!(deadline >= now + 3600);
        assert!(deadline <= now + 3601);
    }
}
