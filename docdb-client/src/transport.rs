//! Terminal transport.
//!
//! The [`Transport`] is the network collaborator at the end of every pipeline.
//! It turns a [`RequestMessage`] into a [`ResponseMessage`] and knows nothing
//! about handlers. Any tower [`Service`] over the message types can serve as
//! a transport through [`ServiceTransport`]:
//!
//! ```ignore
//! use docdb_client::{ClientError, ResponseMessage, ServiceTransport};
//! use http::StatusCode;
//!
//! let transport = ServiceTransport::new(tower::service_fn(|request| async move {
//!     Ok::<_, ClientError>(ResponseMessage::new(StatusCode::OK))
//! }));
//! ```

use std::sync::Arc;

use tower::ServiceExt;
use tower_service::Service;

use crate::handler::BoxFuture;
use crate::{CancellationToken, ClientError, RequestMessage, ResponseMessage};

/// The network collaborator at the end of a pipeline.
pub trait Transport: Send + Sync {
    /// Perform one exchange with the service.
    ///
    /// `cancel` is also observed by the pipeline; implementations may use it
    /// to abort early but are not required to.
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>>;
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        (**self).send(request, cancel)
    }
}

/// Adapts a tower service into a [`Transport`].
///
/// Each exchange clones the service and drives it with `oneshot`, so readiness
/// is awaited per request.
#[derive(Clone, Debug)]
pub struct ServiceTransport<S> {
    service: S,
}

impl<S> ServiceTransport<S> {
    /// Wrap `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Get a reference to the wrapped service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Unwrap the service.
    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<S> Transport for ServiceTransport<S>
where
    S: Service<RequestMessage, Response = ResponseMessage, Error = ClientError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        let service = self.service.clone();
        let request = request.clone();
        Box::pin(service.oneshot(request))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;

    use super::*;
    use crate::{OperationType, ResourceType};

    #[tokio::test]
    async fn test_service_transport_forwards_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let transport = ServiceTransport::new(tower::service_fn(move |request: RequestMessage| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                assert_eq!(request.container_id(), "players");
                Ok::<_, ClientError>(ResponseMessage::new(StatusCode::ACCEPTED))
            }
        }));

        let request = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "players");
        let response = transport
            .send(&request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_transport_error() {
        let transport = ServiceTransport::new(tower::service_fn(|_request: RequestMessage| async {
            Err::<ResponseMessage, _>(ClientError::Transport("connection refused".into()))
        }));

        let request = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "c");
        let err = transport
            .send(&request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
