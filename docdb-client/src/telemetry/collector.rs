//! Telemetry sinks.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use parking_lot::Mutex;

use super::TelemetrySample;
use crate::{ConsistencyLevel, OperationType, ResourceType, TelemetryError};

/// Receives one sample per observed operation.
///
/// Called concurrently from every in-flight operation; implementations
/// serialize access to shared state themselves. An `Err` is logged by the
/// telemetry handler and otherwise ignored.
pub trait TelemetryCollector: Send + Sync {
    fn collect(&self, sample: TelemetrySample) -> Result<(), TelemetryError>;
}

impl<C> TelemetryCollector for Arc<C>
where
    C: TelemetryCollector + ?Sized,
{
    fn collect(&self, sample: TelemetrySample) -> Result<(), TelemetryError> {
        (**self).collect(sample)
    }
}

/// Emits every sample as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCollector;

impl TelemetryCollector for TracingCollector {
    fn collect(&self, sample: TelemetrySample) -> Result<(), TelemetryError> {
        tracing::info!(
            database = %sample.database_id,
            container = %sample.container_id,
            status = sample.status_code.as_u16(),
            operation_type = %sample.operation_type,
            resource_type = %sample.resource_type,
            consistency_level = ?sample.consistency_level,
            request_charge = sample.request_charge,
            payload_size = sample.payload_size,
            "operation telemetry"
        );
        Ok(())
    }
}

/// Grouping key of [`AggregatingCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub database_id: String,
    pub container_id: String,
    pub operation_type: OperationType,
    pub resource_type: ResourceType,
    pub status_code: StatusCode,
    pub consistency_level: Option<ConsistencyLevel>,
}

impl OperationKey {
    fn of(sample: &TelemetrySample) -> Self {
        Self {
            database_id: sample.database_id.clone(),
            container_id: sample.container_id.clone(),
            operation_type: sample.operation_type,
            resource_type: sample.resource_type,
            status_code: sample.status_code,
            consistency_level: sample.consistency_level,
        }
    }
}

/// Running totals for one [`OperationKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationMetrics {
    pub count: u64,
    pub total_request_charge: f64,
    pub max_request_charge: f64,
    pub total_payload_size: u64,
    pub max_payload_size: u64,
}

impl OperationMetrics {
    fn record(&mut self, sample: &TelemetrySample) {
        self.count += 1;
        self.total_request_charge += sample.request_charge;
        self.max_request_charge = self.max_request_charge.max(sample.request_charge);
        self.total_payload_size = self.total_payload_size.saturating_add(sample.payload_size);
        self.max_payload_size = self.max_payload_size.max(sample.payload_size);
    }

    /// Mean request charge, or 0 when nothing was recorded.
    pub fn mean_request_charge(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_request_charge / self.count as f64
        }
    }
}

/// Aggregates samples in memory, keyed by operation.
///
/// Meant to be drained periodically by a reporter.
#[derive(Debug, Default)]
pub struct AggregatingCollector {
    metrics: Mutex<HashMap<OperationKey, OperationMetrics>>,
}

impl AggregatingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current totals.
    pub fn snapshot(&self) -> HashMap<OperationKey, OperationMetrics> {
        self.metrics.lock().clone()
    }

    /// Take the current totals and start over.
    pub fn drain(&self) -> HashMap<OperationKey, OperationMetrics> {
        std::mem::take(&mut *self.metrics.lock())
    }
}

impl TelemetryCollector for AggregatingCollector {
    fn collect(&self, sample: TelemetrySample) -> Result<(), TelemetryError> {
        self.metrics
            .lock()
            .entry(OperationKey::of(&sample))
            .or_default()
            .record(&sample);
        Ok(())
    }
}
