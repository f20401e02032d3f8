//! Request handlers.
//!
//! A handler is one node of the request pipeline. Each handler receives the
//! request together with [`Next`], an explicit handle on the rest of the
//! chain, and decides what to do before and after forwarding:
//!
//! ```ignore
//! use docdb_client::{BoxFuture, CancellationToken, ClientError, Next, RequestHandler,
//!     RequestMessage, ResponseMessage};
//!
//! struct ChargeLogger;
//!
//! impl RequestHandler for ChargeLogger {
//!     fn send<'a>(
//!         &'a self,
//!         request: &'a RequestMessage,
//!         cancel: &'a CancellationToken,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
//!         Box::pin(async move {
//!             let response = next.run(request, cancel).await?;
//!             println!("{} cost {}", request.operation_type(), response.headers().request_charge());
//!             Ok(response)
//!         })
//!     }
//! }
//! ```
//!
//! Handlers run in the order they were added: the first handler sees the
//! request first and the response last.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::transport::Transport;
use crate::{CancellationToken, ClientError, RequestMessage, ResponseMessage};

/// Type alias for a boxed future returning a result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One node of the request pipeline.
pub trait RequestHandler: Send + Sync {
    /// Handle `request`, usually by forwarding it with [`Next::run`].
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>>;
}

impl<H> RequestHandler for Arc<H>
where
    H: RequestHandler + ?Sized,
{
    fn send<'a>(
        &'a self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        (**self).send(request, cancel, next)
    }
}

/// The rest of the pipeline after the current handler.
///
/// Calling [`run`](Self::run) proceeds to the next handler, or to the terminal
/// transport once no handlers remain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    handlers: &'a [Arc<dyn RequestHandler>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(handlers: &'a [Arc<dyn RequestHandler>], transport: &'a dyn Transport) -> Self {
        Self {
            handlers,
            transport,
        }
    }

    /// Number of handlers left before the transport.
    pub fn remaining(&self) -> usize {
        self.handlers.len()
    }

    /// Forward `request` to the rest of the chain.
    ///
    /// The terminal transport call is raced against `cancel`; a cancelled
    /// token yields [`ClientError::Canceled`] and drops the pending exchange.
    pub fn run(
        self,
        request: &'a RequestMessage,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ResponseMessage, ClientError>> {
        match self.handlers.split_first() {
            Some((head, rest)) => head.send(request, cancel, Next::new(rest, self.transport)),
            None => {
                let transport = self.transport;
                Box::pin(async move {
                    cancel
                        .run_until_cancelled(transport.send(request, cancel))
                        .await?
                })
            }
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.handlers.len())
            .finish()
    }
}
