//! Response header flattening
//!
//! The relay returns headers as a plain JSON object, so repeated header names
//! have to be collapsed into a single string.

use hyper::header::HeaderMap;
use serde::Deserialize;
use std::collections::BTreeMap;

/// How repeated header names are collapsed
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMergeRule {
    /// Join all values with `", "` in arrival order
    #[default]
    Join,
    /// Keep only the last value received
    LastWins,
}

/// Flatten `headers` into a name-ordered map with lowercase names.
///
/// Values that are not valid UTF-8 are decoded lossily.
pub fn flatten_headers(headers: &HeaderMap, rule: HeaderMergeRule) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let merged = match rule {
            HeaderMergeRule::Join => values.collect::<Vec<_>>().join(", "),
            HeaderMergeRule::LastWins => values.last().unwrap_or_default(),
        };
        flat.insert(name.as_str().to_string(), merged);
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};

    fn sample() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert(
            HeaderName::from_bytes(b"X-Custom-Thing").expect("header name"),
            HeaderValue::from_static("yes"),
        );
        headers
    }

    #[test]
    fn test_join_rule() {
        let flat = flatten_headers(&sample(), HeaderMergeRule::Join);
        assert_eq!(flat["set-cookie"], "a=1, b=2");
        assert_eq!(flat["content-type"], "text/html");
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_last_wins_rule() {
        let flat = flatten_headers(&sample(), HeaderMergeRule::LastWins);
        assert_eq!(flat["set-cookie"], "b=2");
    }

    #[test]
    fn test_names_are_lowercase() {
        let flat = flatten_headers(&sample(), HeaderMergeRule::Join);
        assert!(flat.contains_key("x-custom-thing"));
        assert!(!flat.contains_key("X-Custom-Thing"));
    }

    #[test]
    fn test_non_utf8_value_is_lossy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-bytes",
            HeaderValue::from_bytes(b"caf\xe9").expect("opaque header bytes"),
        );
        let flat = flatten_headers(&headers, HeaderMergeRule::Join);
        assert!(flat["x-bytes"].starts_with("caf"));
    }
}
