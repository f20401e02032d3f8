use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use http::StatusCode;

use super::{TelemetryCollector, TelemetrySample, payload_size};
use crate::consistency::ConsistencyResolver;
use crate::handler::{BoxFuture, Next, RequestHandler};
use crate::{
    CancellationToken, ClientError, Diagnostics, RequestMessage, ResourceType, ResponseMessage,
    TelemetryError,
};

/// Records one telemetry sample per eligible operation.
///
/// The handler forwards first and observes afterwards. Only requests whose
/// resource type is in the allowed set are observed (items only by default).
/// Observation runs in an isolated region: consistency resolution failures,
/// collector errors and panics are reported with `tracing::error!` and
/// dropped. The caller always gets back the response the rest of the chain
/// produced, untouched.
pub struct TelemetryHandler {
    collector: Arc<dyn TelemetryCollector>,
    resolver: ConsistencyResolver,
    allowed_resource_types: Vec<ResourceType>,
}

/// The parts of a response a sample needs, read without touching the body.
struct Observation {
    status: StatusCode,
    request_charge: f64,
    payload_size: u64,
    diagnostics: Diagnostics,
}

impl Observation {
    fn capture(response: &ResponseMessage) -> Self {
        Self {
            status: response.status(),
            request_charge: response.headers().request_charge(),
            payload_size: payload_size(Some(response)),
            diagnostics: response.diagnostics().clone(),
        }
    }
}

impl TelemetryHandler {
    /// Create a handler observing item operations.
    pub fn new<C>(collector: C, resolver: ConsistencyResolver) -> Self
    where
        C: TelemetryCollector + 'static,
    {
        Self {
            collector: Arc::new(collector),
            resolver,
            allowed_resource_types: vec![ResourceType::Item],
        }
    }

    /// Replace the set of observed resource types.
    pub fn with_allowed_resource_types(mut self, types: impl IntoIterator<Item = ResourceType>) -> Self {
        self.allowed_resource_types = types.into_iter().collect();
        self
    }

    /// Whether operations on `resource_type` are observed.
    pub fn is_allowed(&self, resource_type: ResourceType) -> bool {
        self.allowed_resource_types.contains(&resource_type)
    }

    /// Observe a completed operation.
    ///
    /// Panics raised while reading the response or inside the observation
    /// future come back as [`TelemetryError::Panicked`].
    fn observe_isolated<'a>(
        &'a self,
        request: &'a RequestMessage,
        response: &ResponseMessage,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), TelemetryError>> {
        let captured = std::panic::catch_unwind(AssertUnwindSafe(|| Observation::capture(response)));
        Box::pin(async move {
            let observation = captured.map_err(panic_message)?;
            AssertUnwindSafe(self.observe(request, observation, cancel))
                .catch_unwind()
                .await
                .map_err(panic_message)?
        })
    }

    async fn observe(
        &self,
        request: &RequestMessage,
        observation: Observation,
        cancel: &CancellationToken,
    ) -> Result<(), TelemetryError> {
        let consistency_level = self
            .resolver
            .resolve(request, cancel)
            .await
            .map_err(TelemetryError::Consistency)?;

        self.collector.collect(TelemetrySample {
            container_id: request.container_id().to_owned(),
            database_id: request.database_id().to_owned(),
            status_code: observation.status,
            payload_size: observation.payload_size,
            operation_type: request.operation_type(),
            resource_type: request.resource_type(),
            consistency_level,
            request_charge: observation.request_charge,
            diagnostics: observation.diagnostics,
        })
    }
}

impl RequestHandler for TelemetryHandler {
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        Box::pin(async move {
            let response = next.run(request, cancel).await?;

            if !self.is_allowed(request.resource_type()) {
                return Ok(response);
            }

            let observed = self.observe_isolated(request, &response, cancel);
            if let Err(err) = observed.await {
                tracing::error!(
                    error = %err,
                    activity_id = %request.activity_id(),
                    "error while collecting telemetry information"
                );
            }
            Ok(response)
        })
    }
}

impl std::fmt::Debug for TelemetryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryHandler")
            .field("resolver", &self.resolver)
            .field("allowed_resource_types", &self.allowed_resource_types)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> TelemetryError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    };
    TelemetryError::Panicked(message)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::testing::{FailingCollector, PanickingCollector, RecordingCollector, ScriptedTransport};
    use crate::{
        Content, ConsistencyLevel, DiagnosticsTrace, Headers, OperationType, Pipeline,
        RequestOptions, StaticAccountConsistency,
    };

    fn resolver(account: Option<ConsistencyLevel>) -> ConsistencyResolver {
        ConsistencyResolver::new(None, StaticAccountConsistency(account))
    }

    fn item_request() -> RequestMessage {
        RequestMessage::new(ResourceType::Item, OperationType::Create, "game", "players")
    }

    fn created_response() -> ResponseMessage {
        ResponseMessage::new(StatusCode::CREATED)
            .with_headers(Headers::empty().with_request_charge(7.25))
            .with_content(Content::buffered(Bytes::from_static(b"{\"id\":\"p1\"}")))
            .with_diagnostics(Diagnostics::new(DiagnosticsTrace::new("CreateItem")))
    }

    fn pipeline(transport: ScriptedTransport, telemetry: TelemetryHandler) -> Pipeline {
        Pipeline::builder(transport).with_telemetry(telemetry).build()
    }

    #[tokio::test]
    async fn test_records_sample() {
        let transport = ScriptedTransport::new();
        let diagnostics = {
            let response = created_response();
            let diagnostics = response.diagnostics().clone();
            transport.push(response);
            diagnostics
        };
        let collector = Arc::new(RecordingCollector::new());
        let pipeline = pipeline(
            transport,
            TelemetryHandler::new(collector.clone(), resolver(Some(ConsistencyLevel::Eventual))),
        );

        pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap();

        let samples = collector.samples();
        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.container_id, "players");
        assert_eq!(sample.database_id, "game");
        assert_eq!(sample.status_code, StatusCode::CREATED);
        assert_eq!(sample.payload_size, 11);
        assert_eq!(sample.operation_type, OperationType::Create);
        assert_eq!(sample.resource_type, ResourceType::Item);
        assert_eq!(sample.consistency_level, Some(ConsistencyLevel::Eventual));
        assert_eq!(sample.request_charge, 7.25);
        assert!(sample.diagnostics.ptr_eq(&diagnostics));
    }

    #[tokio::test]
    async fn test_request_override_reaches_sample() {
        let transport = ScriptedTransport::new();
        transport.push(created_response());
        let collector = Arc::new(RecordingCollector::new());
        let pipeline = pipeline(
            transport,
            TelemetryHandler::new(collector.clone(), resolver(Some(ConsistencyLevel::Eventual))),
        );

        let request = item_request()
            .with_options(RequestOptions::new().consistency_level(ConsistencyLevel::Strong));
        pipeline.send(&request, &CancellationToken::new()).await.unwrap();

        assert_eq!(collector.samples()[0].consistency_level, Some(ConsistencyLevel::Strong));
    }

    #[tokio::test]
    async fn test_ineligible_resource_type_not_observed() {
        let transport = ScriptedTransport::new();
        transport.push_status(StatusCode::OK);
        let collector = Arc::new(RecordingCollector::new());
        let pipeline = pipeline(transport, TelemetryHandler::new(collector.clone(), resolver(None)));

        let request = RequestMessage::new(ResourceType::Container, OperationType::Read, "game", "players");
        let response = pipeline.send(&request, &CancellationToken::new()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(collector.samples().is_empty());
    }

    #[tokio::test]
    async fn test_collector_failure_leaves_response_untouched() {
        let transport = ScriptedTransport::new();
        let expected = created_response();
        let expected_diagnostics = expected.diagnostics().clone();
        transport.push(expected);
        let pipeline = pipeline(transport, TelemetryHandler::new(FailingCollector, resolver(None)));

        let mut response = pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().request_charge(), 7.25);
        assert!(response.diagnostics().ptr_eq(&expected_diagnostics));
        let body = response.take_content().unwrap().into_bytes().await.unwrap();
        assert_eq!(body, Bytes::from_static(b"{\"id\":\"p1\"}"));
    }

    #[tokio::test]
    async fn test_collector_panic_is_contained() {
        let transport = ScriptedTransport::new();
        transport.push(created_response());
        let pipeline = pipeline(transport, TelemetryHandler::new(PanickingCollector, resolver(None)));

        let response = pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_consistency_failure_is_contained() {
        struct Unreachable;

        impl crate::AccountConsistencyProvider for Unreachable {
            fn account_consistency<'a>(
                &'a self,
                _cancel: &'a CancellationToken,
            ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
                Box::pin(async { Err(ClientError::Transport("account unreachable".into())) })
            }
        }

        let transport = ScriptedTransport::new();
        transport.push(created_response());
        let collector = Arc::new(RecordingCollector::new());
        let telemetry = TelemetryHandler::new(collector.clone(), ConsistencyResolver::new(None, Unreachable));
        let pipeline = pipeline(transport, telemetry);

        let response = pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(collector.samples().is_empty());
    }

    #[tokio::test]
    async fn test_downstream_error_propagates_without_sample() {
        let transport = ScriptedTransport::new();
        transport.push_error(ClientError::Transport("connection reset".into()));
        let collector = Arc::new(RecordingCollector::new());
        let pipeline = pipeline(transport, TelemetryHandler::new(collector.clone(), resolver(None)));

        let err = pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert!(collector.samples().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_still_observed() {
        let transport = ScriptedTransport::new();
        transport.push_status(StatusCode::CONFLICT);
        let collector = Arc::new(RecordingCollector::new());
        let pipeline = pipeline(transport, TelemetryHandler::new(collector.clone(), resolver(None)));

        let response = pipeline
            .send(&item_request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(collector.samples()[0].status_code, StatusCode::CONFLICT);
    }

    #[test]
    fn test_panic_message() {
        let err = panic_message(Box::new("boom"));
        assert_eq!(err.to_string(), "telemetry observation panicked: boom");
        let err = panic_message(Box::new(String::from("bang")));
        assert!(matches!(err, TelemetryError::Panicked(m) if m == "bang"));
        let err = panic_message(Box::new(42_u8));
        assert!(matches!(err, TelemetryError::Panicked(m) if m == "unknown panic"));
    }
}
