//! Entry addressing
//!
//! An entry is the `(bucket, key)` identity of a stored object. The service
//! addresses entries by a URL-safe base64 token of `bucket:key`; the join
//! happens on raw bytes before encoding, so `:` inside a bucket or key never
//! collides with the separator once encoded.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;

/// Logical identity of one stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub bucket: String,
    /// Object key; empty means "no key" (hash-named objects)
    pub key: String,
}

impl Entry {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Encoded `bucket:key` token
    pub fn encode(&self) -> String {
        encoded_entry(&self.bucket, &self.key)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// URL-safe base64 with padding
pub fn urlsafe_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(data)
}

/// Encode `bucket:key` as a URL-safe token
pub fn encoded_entry(bucket: impl AsRef<[u8]>, key: impl AsRef<[u8]>) -> String {
    let bucket = bucket.as_ref();
    let key = key.as_ref();
    let mut joined = Vec::with_capacity(bucket.len() + key.len() + 1);
    joined.extend_from_slice(bucket);
    joined.push(b':');
    joined.extend_from_slice(key);
    urlsafe_encode(joined)
}

/// Encode a bucket alone, addressing "whatever key the content hash yields"
pub fn encoded_entry_without_key(bucket: impl AsRef<[u8]>) -> String {
    urlsafe_encode(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    fn decode(token: &str) -> Vec<u8> {
        URL_SAFE.decode(token).unwrap()
    }

    #[test]
    fn test_encoded_entry_known_value() {
        assert_eq!(encoded_entry("bucket", "key"), "YnVja2V0OmtleQ==");
        assert_eq!(Entry::new("bucket", "key").encode(), "YnVja2V0OmtleQ==");
    }

    #[test]
    fn test_encoded_entry_empty_key_keeps_separator() {
        assert_eq!(decode(&encoded_entry("bucket", "")), b"bucket:");
    }

    #[test]
    fn test_encoded_entry_without_key() {
        assert_eq!(encoded_entry_without_key("bucket"), "YnVja2V0");
        assert_eq!(decode(&encoded_entry_without_key("bucket")), b"bucket");
    }

    #[test]
    fn test_encoded_entry_is_url_safe() {
        // Bytes chosen so the standard alphabet would emit '+' and '/'
        let token = encoded_entry([0xfb, 0xff], [0xfe, 0xbf]);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '=')
        );
    }

    #[test]
    fn test_encoded_entry_round_trips_arbitrary_bytes() {
        let bucket: &[u8] = b"b\x00\xff:1";
        let key: &[u8] = "目录/文件 名.txt".as_bytes();
        let mut expected = bucket.to_vec();
        expected.push(b':');
        expected.extend_from_slice(key);
        assert_eq!(decode(&encoded_entry(bucket, key)), expected);
    }

    #[test]
    fn test_encoded_entry_deterministic_and_distinct() {
        assert_eq!(encoded_entry("a", "b:c"), encoded_entry("a", "b:c"));
        assert_ne!(encoded_entry("a", "b:c"), encoded_entry("a", "bc"));
        assert_ne!(encoded_entry("a", "k"), encoded_entry("b", "k"));
        assert_ne!(encoded_entry("a", ""), encoded_entry_without_key("a"));
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(Entry::new("photos", "2024/a.jpg").to_string(), "photos/2024/a.jpg");
    }
}
