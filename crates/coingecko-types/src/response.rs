//! Decoded API responses

use serde_json::Value;
use std::collections::BTreeMap;

/// Header carrying the number of items per page on paginated endpoints
pub const PER_PAGE_HEADER: &str = "Per-Page";
/// Header carrying the total number of items on paginated endpoints
pub const TOTAL_HEADER: &str = "Total";

/// HTTP metadata of a response
///
/// Header names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP status code
    pub status: u16,
    headers: BTreeMap<String, String>,
}

impl ResponseMeta {
    /// Create metadata for a response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Insert a header, replacing any previous value
    pub fn insert_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse a decimal-integer header
    ///
    /// Returns `Err` with a description when the header is missing or not
    /// a non-negative integer.
    pub fn header_u64(&self, name: &str) -> Result<u64, String> {
        let raw = self
            .header(name)
            .ok_or_else(|| format!("missing {} header", name))?;
        raw.trim()
            .parse::<u64>()
            .map_err(|_| format!("{} header is not an integer: {:?}", name, raw))
    }

    /// All headers, lowercased
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Result of one endpoint invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Decoded JSON body
    pub body: Value,
    /// Response metadata, present only when it was requested
    pub meta: Option<ResponseMeta>,
}

impl Payload {
    /// A body without metadata
    pub fn body(body: Value) -> Self {
        Self { body, meta: None }
    }

    /// A body together with its response metadata
    pub fn with_meta(body: Value, meta: ResponseMeta) -> Self {
        Self {
            body,
            meta: Some(meta),
        }
    }

    /// Consume the payload, keeping only the body
    pub fn into_body(self) -> Value {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let meta = ResponseMeta::new(200).with_header("Per-Page", "100");
        assert_eq!(meta.header("per-page"), Some("100"));
        assert_eq!(meta.header("PER-PAGE"), Some("100"));
        assert_eq!(meta.header_u64(PER_PAGE_HEADER), Ok(100));
    }

    #[test]
    fn test_header_u64_errors() {
        let meta = ResponseMeta::new(200).with_header(TOTAL_HEADER, "lots");
        assert!(meta.header_u64(TOTAL_HEADER).is_err());
        assert!(meta.header_u64(PER_PAGE_HEADER).unwrap_err().contains("missing"));
    }

    #[test]
    fn test_payload_into_body() {
        let payload = Payload::with_meta(
            json!({"gecko_says": "(V3) To the Moon!"}),
            ResponseMeta::new(200),
        );
        assert!(payload.meta.is_some());
        assert_eq!(payload.into_body()["gecko_says"], "(V3) To the Moon!");
    }
}
