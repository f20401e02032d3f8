//! Response header bag.

use http::HeaderMap;
use http::header::{CONTENT_LENGTH, HeaderName, HeaderValue};

/// Header carrying the normalized cost of an operation.
pub const REQUEST_CHARGE: &str = "x-ms-request-charge";

/// Header carrying the continuation token of a paged read.
pub const CONTINUATION: &str = "x-ms-continuation";

/// Header echoing the request's activity id.
pub const ACTIVITY_ID: &str = "x-ms-activity-id";

/// Response headers with typed accessors for the service headers the
/// pipeline reads.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HeaderMap,
}

impl Headers {
    /// Wrap raw HTTP headers.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Create an empty header bag.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Request charge reported by the service.
    ///
    /// Missing, malformed, negative and non-finite values read as `0.0`, so
    /// the charge is always a non-negative number.
    pub fn request_charge(&self) -> f64 {
        self.get(REQUEST_CHARGE)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|charge| charge.is_finite() && *charge >= 0.0)
            .unwrap_or(0.0)
    }

    /// Raw `content-length` header value, if present.
    pub fn content_length(&self) -> Option<&str> {
        self.get(CONTENT_LENGTH.as_str())
    }

    /// Continuation token for the next page, if any.
    pub fn continuation(&self) -> Option<&str> {
        self.get(CONTINUATION)
    }

    /// Activity id echoed by the service, if any.
    pub fn activity_id(&self) -> Option<&str> {
        self.get(ACTIVITY_ID)
    }

    /// Get a header value by name.
    ///
    /// Returns `None` if the header is not present or is not valid UTF-8.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// Insert a header, returning self.
    pub fn with(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the request charge header.
    pub fn with_request_charge(self, charge: f64) -> Self {
        self.with_str(REQUEST_CHARGE, &charge.to_string())
    }

    /// Set the continuation header.
    pub fn with_continuation(self, token: &str) -> Self {
        self.with_str(CONTINUATION, token)
    }

    /// Set the `content-length` header.
    pub fn with_content_length(self, value: &str) -> Self {
        self.with_str("content-length", value)
    }

    fn with_str(self, name: &'static str, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => self.with(HeaderName::from_static(name), value),
            Err(_) => {
                tracing::debug!(header = name, "dropping header with invalid value");
                self
            }
        }
    }

    /// Get the underlying HeaderMap.
    pub fn as_header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume self and return the underlying HeaderMap.
    pub fn into_header_map(self) -> HeaderMap {
        self.headers
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }
}

impl From<HeaderMap> for Headers {
    fn from(headers: HeaderMap) -> Self {
        Self::new(headers)
    }
}
