//! Benchmark operations for the docdb client.
//!
//! Each benchmark is a [`BenchmarkOperation`]: a one-time [`prepare`] step that
//! seeds whatever data the operation needs, and an [`execute_once`] step the
//! harness calls repeatedly to measure.
//!
//! [`prepare`]: BenchmarkOperation::prepare
//! [`execute_once`]: BenchmarkOperation::execute_once

mod error;
mod json;
mod operation;
mod pool;
mod query_stream;

pub use error::BenchmarkError;
pub use json::to_pooled_json;
pub use operation::{BenchmarkOperation, OperationResult};
pub use pool::{BufferPool, PooledBuffer};
pub use query_stream::QueryStreamSinglePkOperation;
