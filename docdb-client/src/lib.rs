//! Request pipeline for a document database client.
//!
//! This crate provides the client-side plumbing that sits between calling code
//! and the network transport:
//!
//! - An ordered chain of [`RequestHandler`]s in front of a [`Transport`],
//!   assembled with [`PipelineBuilder`]
//! - A [`TelemetryHandler`] that records one [`TelemetrySample`] per item
//!   operation without ever affecting the operation itself
//! - Effective consistency resolution across request, client and account
//!   scopes ([`ConsistencyResolver`])
//! - Paged query consumption ([`FeedCursor`], [`drain_feed`], [`PipelineFeed`])
//! - A [`ContainerClient`] for stream-level item operations
//!
//! ## Example
//!
//! ```ignore
//! use docdb_client::{
//!     CachedAccountConsistency, CancellationToken, ClientOptions, ConsistencyLevel,
//!     ContainerClient, PipelineBuilder, QueryDefinition, QueryRequestOptions,
//!     TracingCollector, drain_feed,
//! };
//!
//! let options = ClientOptions::new().consistency_level(ConsistencyLevel::Session);
//!
//! let pipeline = PipelineBuilder::new(transport)
//!     .with_client_telemetry(&options, TracingCollector, CachedAccountConsistency::new(account))
//!     .build();
//!
//! let container = ContainerClient::new(pipeline, "game", "players");
//! let cancel = CancellationToken::new();
//!
//! let query = QueryDefinition::new("select * from T where T.playerId = @id")
//!     .with_parameter("@id", "a067ff");
//! let mut feed = container.query_items_stream(&query, QueryRequestOptions::new().max_item_count(1))?;
//!
//! let summary = drain_feed(&mut feed, &cancel).await?;
//! println!("{} RU over {} pages", summary.total_charge, summary.pages);
//! ```
//!
//! ## Cancellation
//!
//! Every operation takes a [`CancellationToken`]. The token is observed at
//! each suspension point: the transport exchange, the account consistency
//! lookup and every page read. A cancelled operation fails with
//! [`ClientError::Canceled`]. Work the service already committed is not
//! rolled back.
//!
//! ## Telemetry Isolation
//!
//! Nothing on the telemetry path reaches the caller. Consistency lookup
//! failures, collector errors and panics inside a collector are logged with
//! `tracing::error!` and dropped; the response is returned exactly as the
//! transport produced it.
//!
//! ## Logging
//!
//! All logging goes through `tracing`. Each pipeline invocation runs inside a
//! `docdb.request` debug span. Installing a subscriber is up to the
//! application.
//!
//! ## Feature Flags
//!
//! - `test-util` - exposes the [`testing`] module (scripted transports,
//!   cursors and collectors) to downstream tests

mod builder;
mod cancel;
mod consistency;
mod container;
mod error;
mod feed;
mod handler;
mod options;
mod pipeline;
pub mod request;
pub mod response;
pub mod telemetry;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use builder::PipelineBuilder;
pub use cancel::CancellationToken;
pub use consistency::{
    AccountConsistencyProvider, CachedAccountConsistency, ConsistencyLevel, ConsistencyResolver,
    ConsistencySource, StaticAccountConsistency,
};
pub use container::{ContainerClient, QueryDefinition, QueryParameter};
pub use error::{ClientError, TelemetryError};
pub use feed::{FeedCursor, FeedSummary, PipelineFeed, drain_feed};
pub use handler::{BoxFuture, Next, RequestHandler};
pub use options::{ClientOptions, QueryRequestOptions, RequestOptions, TelemetryOptions};
pub use pipeline::Pipeline;

// Re-export from request module
pub use request::{OperationType, RequestMessage, ResourceType};

// Re-export from response module
pub use response::{Content, ContentStream, Diagnostics, DiagnosticsTrace, Headers, ResponseMessage};

// Re-export from telemetry module
pub use telemetry::{
    AggregatingCollector, OperationKey, OperationMetrics, TelemetryCollector, TelemetryHandler,
    TelemetrySample, TracingCollector, payload_size,
};

pub use transport::{ServiceTransport, Transport};

// Re-export core types used in the public API
pub use docdb_core::{SerializerError, TypedSerializer};

pub use bytes::Bytes;
