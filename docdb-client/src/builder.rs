//! Pipeline builder.
//!
//! Provides a fluent API for assembling a [`Pipeline`].

use std::sync::Arc;

use crate::consistency::{AccountConsistencyProvider, ConsistencyResolver};
use crate::handler::RequestHandler;
use crate::pipeline::Pipeline;
use crate::telemetry::{TelemetryCollector, TelemetryHandler};
use crate::transport::Transport;
use crate::ClientOptions;

/// Builder for creating a [`Pipeline`].
///
/// Handlers run in the order they are added. A telemetry handler is always
/// placed last, next to the transport, so it observes the response exactly as
/// the transport produced it.
///
/// # Example
///
/// ```ignore
/// use docdb_client::{ClientOptions, PipelineBuilder, StaticAccountConsistency, TracingCollector};
///
/// let options = ClientOptions::new().consistency_level(ConsistencyLevel::Session);
///
/// let pipeline = PipelineBuilder::new(transport)
///     .with_handler(ChargeLogger)
///     .with_client_telemetry(&options, TracingCollector, StaticAccountConsistency(None))
///     .build();
/// ```
pub struct PipelineBuilder {
    handlers: Vec<Arc<dyn RequestHandler>>,
    telemetry: Option<TelemetryHandler>,
    transport: Arc<dyn Transport>,
}

impl PipelineBuilder {
    /// Create a builder for a pipeline ending in `transport`.
    pub fn new<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            handlers: Vec::new(),
            telemetry: None,
            transport: Arc::new(transport),
        }
    }

    /// Append a handler.
    pub fn with_handler<H>(mut self, handler: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Append a handler that is shared with other pipelines.
    pub fn with_shared_handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Install the telemetry handler.
    ///
    /// Replaces any telemetry handler installed earlier.
    pub fn with_telemetry(mut self, telemetry: TelemetryHandler) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Install a telemetry handler configured from client options.
    ///
    /// Does nothing when telemetry is disabled in `options`.
    pub fn with_client_telemetry<C, P>(self, options: &ClientOptions, collector: C, account: P) -> Self
    where
        C: TelemetryCollector + 'static,
        P: AccountConsistencyProvider + 'static,
    {
        if !options.telemetry().is_enabled() {
            tracing::debug!("client telemetry disabled");
            return self;
        }

        let resolver = ConsistencyResolver::new(options.get_consistency_level(), account);
        let telemetry = TelemetryHandler::new(collector, resolver)
            .with_allowed_resource_types(options.telemetry().get_allowed_resource_types().iter().copied());
        self.with_telemetry(telemetry)
    }

    /// Number of handlers added so far, including telemetry.
    pub fn len(&self) -> usize {
        self.handlers.len() + usize::from(self.telemetry.is_some())
    }

    /// Returns true if no handler has been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        let mut handlers = self.handlers;
        if let Some(telemetry) = self.telemetry {
            handlers.push(Arc::new(telemetry));
        }
        Pipeline::new(handlers, self.transport)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("handlers", &self.handlers.len())
            .field("telemetry", &self.telemetry.is_some())
            .finish_non_exhaustive()
    }
}
