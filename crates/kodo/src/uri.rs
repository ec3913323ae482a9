//! Request path builders
//!
//! Pure functions from typed arguments to request paths. The object
//! operations double as batch commands: their output goes verbatim into
//! the `op=` lines of a batch request.

use kc_core::{Entry, ListQuery, urlsafe_encode};

/// Form/query escaping: percent-encode everything but unreserved bytes, space as `+`
pub fn query_escape(s: &str) -> String {
    urlencoding::encode(s).replace("%20", "+")
}

/// Encode key/value pairs as a query string, sorted by key
pub fn encode_query(pairs: &[(&str, &str)]) -> String {
    let mut pairs = pairs.to_vec();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", query_escape(k), query_escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn uri_stat(entry: &Entry) -> String {
    format!("/stat/{}", entry.encode())
}

pub fn uri_delete(entry: &Entry) -> String {
    format!("/delete/{}", entry.encode())
}

pub fn uri_copy(src: &Entry, dst: &Entry, force: bool) -> String {
    format!("/copy/{}/{}/force/{force}", src.encode(), dst.encode())
}

pub fn uri_move(src: &Entry, dst: &Entry, force: bool) -> String {
    format!("/move/{}/{}/force/{force}", src.encode(), dst.encode())
}

/// `enabled` maps to status 0, disabled to 1
pub fn uri_change_status(entry: &Entry, enabled: bool) -> String {
    let status = if enabled { 0 } else { 1 };
    format!("/chstatus/{}/status/{status}", entry.encode())
}

pub fn uri_change_mime(entry: &Entry, mime: &str) -> String {
    format!("/chgm/{}/mime/{}", entry.encode(), urlsafe_encode(mime))
}

pub fn uri_change_type(entry: &Entry, file_type: i32) -> String {
    format!("/chtype/{}/type/{file_type}", entry.encode())
}

pub fn uri_restore_archive(entry: &Entry, freeze_after_days: i32) -> String {
    format!(
        "/restoreAr/{}/freezeAfterDays/{freeze_after_days}",
        entry.encode()
    )
}

pub fn uri_delete_after_days(entry: &Entry, days: i32) -> String {
    format!("/deleteAfterDays/{}/{days}", entry.encode())
}

/// Fetch into `bucket`; without a key the object is named by its content hash
pub fn uri_fetch(url: &str, bucket: &str, key: Option<&str>) -> String {
    let target = match key {
        Some(key) => kc_core::encoded_entry(bucket, key),
        None => kc_core::encoded_entry_without_key(bucket),
    };
    format!("/fetch/{}/to/{target}", urlsafe_encode(url))
}

pub fn uri_prefetch(entry: &Entry) -> String {
    format!("/prefetch/{}", entry.encode())
}

/// Mirror source for `bucket`, optionally with the `Host` header sent upstream
pub fn uri_set_image(site_url: &str, bucket: &str, host: Option<&str>) -> String {
    let mut uri = format!("/image/{bucket}/from/{}", urlsafe_encode(site_url));
    if let Some(host) = host {
        uri.push_str("/host/");
        uri.push_str(&urlsafe_encode(host));
    }
    uri
}

pub fn uri_unset_image(bucket: &str) -> String {
    format!("/unimage/{bucket}")
}

fn list_params<'a>(bucket: &'a str, query: &'a ListQuery) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![("bucket", bucket)];
    for (name, value) in [
        ("prefix", query.prefix.as_str()),
        ("delimiter", query.delimiter.as_str()),
        ("marker", query.marker.as_str()),
    ] {
        if !value.is_empty() {
            params.push((name, value));
        }
    }
    params
}

/// Bounded listing; empty filters are left out
pub fn uri_list(bucket: &str, query: &ListQuery, limit: i64) -> String {
    let limit = limit.to_string();
    let mut params = list_params(bucket, query);
    params.push(("limit", &limit));
    format!("/list?{}", encode_query(&params))
}

/// Streaming listing; the server pages internally
pub fn uri_list_v2(bucket: &str, query: &ListQuery) -> String {
    format!("/v2/list?{}", encode_query(&list_params(bucket, query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry::new("bucket", "key")
    }

    #[test]
    fn test_query_escape() {
        assert_eq!(query_escape("a b/c|d+e"), "a+b%2Fc%7Cd%2Be");
        assert_eq!(query_escape("safe-._~"), "safe-._~");
        assert_eq!(query_escape("中"), "%E4%B8%AD");
    }

    #[test]
    fn test_encode_query_sorts_keys() {
        assert_eq!(
            encode_query(&[("z", "1"), ("a", "x y"), ("m", "/")]),
            "a=x+y&m=%2F&z=1"
        );
        assert_eq!(encode_query(&[]), "");
    }

    #[test]
    fn test_object_uris() {
        let src = entry();
        let dst = Entry::new("other", "copy");
        assert_eq!(uri_stat(&src), "/stat/YnVja2V0OmtleQ==");
        assert_eq!(uri_delete(&src), "/delete/YnVja2V0OmtleQ==");
        assert_eq!(
            uri_copy(&src, &dst, true),
            format!("/copy/YnVja2V0OmtleQ==/{}/force/true", dst.encode())
        );
        assert_eq!(
            uri_move(&src, &dst, false),
            format!("/move/YnVja2V0OmtleQ==/{}/force/false", dst.encode())
        );
        assert_eq!(uri_prefetch(&src), "/prefetch/YnVja2V0OmtleQ==");
    }

    #[test]
    fn test_attribute_uris() {
        let e = entry();
        assert_eq!(
            uri_change_status(&e, true),
            "/chstatus/YnVja2V0OmtleQ==/status/0"
        );
        assert_eq!(
            uri_change_status(&e, false),
            "/chstatus/YnVja2V0OmtleQ==/status/1"
        );
        assert_eq!(
            uri_change_mime(&e, "text/plain"),
            "/chgm/YnVja2V0OmtleQ==/mime/dGV4dC9wbGFpbg=="
        );
        assert_eq!(uri_change_type(&e, 2), "/chtype/YnVja2V0OmtleQ==/type/2");
        assert_eq!(
            uri_restore_archive(&e, 7),
            "/restoreAr/YnVja2V0OmtleQ==/freezeAfterDays/7"
        );
        assert_eq!(
            uri_delete_after_days(&e, 30),
            "/deleteAfterDays/YnVja2V0OmtleQ==/30"
        );
    }

    #[test]
    fn test_fetch_uris() {
        let url = "http://a.com/b";
        let encoded_url = urlsafe_encode(url);
        assert_eq!(
            uri_fetch(url, "bucket", Some("key")),
            format!("/fetch/{encoded_url}/to/YnVja2V0OmtleQ==")
        );
        assert_eq!(
            uri_fetch(url, "bucket", None),
            format!("/fetch/{encoded_url}/to/YnVja2V0")
        );
    }

    #[test]
    fn test_image_uris() {
        let site = urlsafe_encode("http://origin.com");
        assert_eq!(
            uri_set_image("http://origin.com", "b", None),
            format!("/image/b/from/{site}")
        );
        assert_eq!(
            uri_set_image("http://origin.com", "b", Some("cdn.com")),
            format!("/image/b/from/{site}/host/{}", urlsafe_encode("cdn.com"))
        );
        assert_eq!(uri_unset_image("b"), "/unimage/b");
    }

    #[test]
    fn test_list_uris() {
        assert_eq!(
            uri_list("b", &ListQuery::default(), 1000),
            "/list?bucket=b&limit=1000"
        );
        let query = ListQuery::prefix("photos/2024 ")
            .with_delimiter("/")
            .with_marker("eyJjIjowfQ==");
        assert_eq!(
            uri_list("b", &query, 10),
            "/list?bucket=b&delimiter=%2F&limit=10&marker=eyJjIjowfQ%3D%3D&prefix=photos%2F2024+"
        );
        assert_eq!(
            uri_list_v2("b", &query),
            "/v2/list?bucket=b&delimiter=%2F&marker=eyJjIjowfQ%3D%3D&prefix=photos%2F2024+"
        );
        assert_eq!(uri_list_v2("b", &ListQuery::default()), "/v2/list?bucket=b");
    }
}
