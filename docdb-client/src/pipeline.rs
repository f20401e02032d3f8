//! The assembled request pipeline.

use std::sync::Arc;

use tracing::Instrument;

use crate::builder::PipelineBuilder;
use crate::handler::{Next, RequestHandler};
use crate::transport::Transport;
use crate::{CancellationToken, ClientError, RequestMessage, ResponseMessage};

/// An ordered chain of [`RequestHandler`]s in front of a [`Transport`].
///
/// Cloning is cheap; clones share the same handlers and transport.
///
/// # Example
///
/// ```ignore
/// use docdb_client::{CancellationToken, OperationType, Pipeline, RequestMessage, ResourceType};
///
/// let pipeline = Pipeline::builder(transport)
///     .with_handler(ChargeLogger)
///     .build();
///
/// let request = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "players")
///     .with_item_id("p1")
///     .with_partition_key("p1");
/// let response = pipeline.send(&request, &CancellationToken::new()).await?;
/// ```
#[derive(Clone)]
pub struct Pipeline {
    handlers: Arc<[Arc<dyn RequestHandler>]>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub(crate) fn new(handlers: Vec<Arc<dyn RequestHandler>>, transport: Arc<dyn Transport>) -> Self {
        Self {
            handlers: handlers.into(),
            transport,
        }
    }

    /// Start building a pipeline that ends in `transport`.
    pub fn builder<T>(transport: T) -> PipelineBuilder
    where
        T: Transport + 'static,
    {
        PipelineBuilder::new(transport)
    }

    /// Number of handlers in front of the transport.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if requests go straight to the transport.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Send `request` through every handler and the transport.
    ///
    /// The returned error is whatever the chain produced; handlers that only
    /// observe never add failures of their own.
    pub async fn send(
        &self,
        request: &RequestMessage,
        cancel: &CancellationToken,
    ) -> Result<ResponseMessage, ClientError> {
        let span = tracing::debug_span!(
            "docdb.request",
            resource_type = %request.resource_type(),
            operation_type = %request.operation_type(),
            database = request.database_id(),
            container = request.container_id(),
            activity_id = %request.activity_id(),
        );

        async {
            let result = Next::new(&self.handlers, self.transport.as_ref())
                .run(request, cancel)
                .await;
            match &result {
                Ok(response) => tracing::debug!(
                    status = response.status().as_u16(),
                    request_charge = response.headers().request_charge(),
                    "request completed"
                ),
                Err(err) => tracing::debug!(error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::testing::{PendingTransport, ScriptedTransport};
    use crate::{OperationType, ResourceType};

    fn request() -> RequestMessage {
        RequestMessage::new(ResourceType::Item, OperationType::Create, "db", "players")
    }

    #[tokio::test]
    async fn test_send_without_handlers() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(StatusCode::CREATED);
        let pipeline = Pipeline::builder(transport.clone()).build();
        assert!(pipeline.is_empty());

        let response = pipeline
            .send(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(transport.requests()[0].container_id(), "players");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = ScriptedTransport::new();
        transport.push_error(ClientError::Transport("connection reset".into()));
        let pipeline = Pipeline::builder(transport).build();

        let err = pipeline
            .send(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let pipeline = Pipeline::builder(PendingTransport).build();
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = pipeline.send(&request(), &cancel).await.unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_clones_share_chain() {
        let transport = ScriptedTransport::new();
        transport.push_status(StatusCode::OK);
        transport.push_status(StatusCode::OK);
        let pipeline = Pipeline::builder(transport).build();
        let clone = pipeline.clone();

        let cancel = CancellationToken::new();
        pipeline.send(&request(), &cancel).await.unwrap();
        clone.send(&request(), &cancel).await.unwrap();
        assert_eq!(pipeline.len(), clone.len());
    }
}
