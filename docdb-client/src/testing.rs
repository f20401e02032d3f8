//! Scripted collaborators for tests.
//!
//! Available to this crate's tests and, with the `test-util` feature, to
//! downstream crates.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures::{StreamExt, stream};
use http::StatusCode;
use parking_lot::Mutex;

use crate::feed::FeedCursor;
use crate::handler::BoxFuture;
use crate::telemetry::{TelemetryCollector, TelemetrySample};
use crate::transport::Transport;
use crate::{
    CancellationToken, ClientError, Content, Diagnostics, DiagnosticsTrace, Headers, RequestMessage,
    ResponseMessage, TelemetryError,
};

/// Transport that answers from a queue and records every request.
///
/// Once the queue is empty every exchange fails with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ResponseMessage, ClientError>>>,
    requests: Mutex<Vec<RequestMessage>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push(&self, response: ResponseMessage) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Queue an empty response with `status`.
    pub fn push_status(&self, status: StatusCode) {
        self.push(ResponseMessage::new(status));
    }

    /// Queue a failed exchange.
    pub fn push_error(&self, error: ClientError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Copies of the requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RequestMessage> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        self.requests.lock().push(request.clone());
        let next = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted response left".into())));
        Box::pin(async move { next })
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("pending", &self.pending())
            .field("calls", &self.calls())
            .finish()
    }
}

/// Transport whose exchanges never complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingTransport;

impl Transport for PendingTransport {
    fn send<'a>(
        &'a self,
        _request: &'a RequestMessage,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        Box::pin(std::future::pending())
    }
}

/// Collector that keeps every sample.
#[derive(Debug, Default)]
pub struct RecordingCollector {
    samples: Mutex<Vec<TelemetrySample>>,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<TelemetrySample> {
        self.samples.lock().clone()
    }
}

impl TelemetryCollector for RecordingCollector {
    fn collect(&self, sample: TelemetrySample) -> Result<(), TelemetryError> {
        self.samples.lock().push(sample);
        Ok(())
    }
}

/// Collector that rejects every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCollector;

impl TelemetryCollector for FailingCollector {
    fn collect(&self, _sample: TelemetrySample) -> Result<(), TelemetryError> {
        Err(TelemetryError::Collector("collector unavailable".into()))
    }
}

/// Collector that panics on every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingCollector;

impl TelemetryCollector for PanickingCollector {
    fn collect(&self, _sample: TelemetrySample) -> Result<(), TelemetryError> {
        panic!("collector exploded")
    }
}

/// Cursor that yields a fixed list of pages.
#[derive(Debug)]
pub struct ScriptedCursor {
    pages: VecDeque<Result<ResponseMessage, ClientError>>,
    reads: usize,
}

impl ScriptedCursor {
    pub fn new(pages: Vec<Result<ResponseMessage, ClientError>>) -> Self {
        Self {
            pages: pages.into(),
            reads: 0,
        }
    }

    /// Number of pages read so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl FeedCursor for ScriptedCursor {
    fn has_more_results(&self) -> bool {
        !self.pages.is_empty()
    }

    fn read_next<'a>(
        &'a mut self,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        self.reads += 1;
        let next = self
            .pages
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Protocol("cursor exhausted".into())));
        Box::pin(async move { next })
    }
}

/// A page with `status`, `charge` and a diagnostics trace named `trace`.
pub fn page(status: StatusCode, charge: f64, trace: &str) -> ResponseMessage {
    ResponseMessage::new(status)
        .with_headers(Headers::empty().with_request_charge(charge))
        .with_content(Content::buffered(Bytes::from_static(b"{\"Documents\":[]}")))
        .with_diagnostics(Diagnostics::new(DiagnosticsTrace::new(trace)))
}

/// Reports whether tracked content has been dropped.
#[derive(Debug, Clone)]
pub struct ReleaseProbe {
    released: Arc<AtomicBool>,
}

impl ReleaseProbe {
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A page with streamed content whose release can be observed.
pub fn tracked_page(status: StatusCode, charge: f64) -> (ResponseMessage, ReleaseProbe) {
    let released = Arc::new(AtomicBool::new(false));
    let guard = ReleaseGuard(released.clone());
    let content = Content::streaming(
        stream::iter(vec![Ok(Bytes::from_static(b"{}"))]).map(move |chunk| {
            let _held = &guard;
            chunk
        }),
    );
    let response = ResponseMessage::new(status)
        .with_headers(Headers::empty().with_request_charge(charge))
        .with_content(content);
    (response, ReleaseProbe { released })
}
