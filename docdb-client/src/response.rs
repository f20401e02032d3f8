//! Response types for the handler pipeline.
//!
//! This module provides [`ResponseMessage`], which carries the status, headers,
//! content and diagnostics of one operation back up the pipeline. Handlers see
//! the response by value on its way back to the caller but only ever read it;
//! ownership ends with the caller, and dropping the response releases its
//! content.

mod content;
mod diagnostics;
mod headers;

pub use content::{Content, ContentStream};
pub use diagnostics::{Diagnostics, DiagnosticsTrace};
pub use headers::{ACTIVITY_ID, CONTINUATION, Headers, REQUEST_CHARGE};

use docdb_core::TypedSerializer;
use http::StatusCode;

use crate::ClientError;

/// The response to one operation.
///
/// # Example
///
/// ```ignore
/// let response = pipeline.send(&request, &cancel).await?;
///
/// println!("status: {}", response.status());
/// println!("charge: {}", response.headers().request_charge());
///
/// // Diagnostics are only rendered when formatted.
/// println!("{}", response.diagnostics());
/// ```
#[derive(Debug)]
pub struct ResponseMessage {
    status: StatusCode,
    headers: Headers,
    content: Option<Content>,
    diagnostics: Diagnostics,
}

impl ResponseMessage {
    /// Create a response with the given status, no headers and no content.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::empty(),
            content: None,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Set the headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the content.
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The content, unless it has been taken.
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Take ownership of the content, leaving `None` in place.
    pub fn take_content(&mut self) -> Option<Content> {
        self.content.take()
    }

    /// Read the whole content and decode it with `serializer`.
    ///
    /// A response without content decodes from the empty byte sequence.
    pub async fn into_typed<T, S>(mut self, serializer: &S) -> Result<T, ClientError>
    where
        S: TypedSerializer<T> + ?Sized,
    {
        let bytes = match self.take_content() {
            Some(content) => content.into_bytes().await?,
            None => bytes::Bytes::new(),
        };
        Ok(serializer.deserialize(&bytes)?)
    }
}
