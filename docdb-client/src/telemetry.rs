//! Client telemetry.
//!
//! The [`TelemetryHandler`] sits at the end of the handler chain and records
//! one [`TelemetrySample`] per eligible operation into a
//! [`TelemetryCollector`]. Observation never affects the operation: the
//! response is returned exactly as the transport produced it, and every
//! failure on the telemetry path (including panics) is logged and dropped.

mod collector;
mod handler;
mod payload;
mod sample;

pub use collector::{AggregatingCollector, OperationKey, OperationMetrics, TelemetryCollector, TracingCollector};
pub use handler::TelemetryHandler;
pub use payload::payload_size;
pub use sample::TelemetrySample;
