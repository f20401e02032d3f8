use http::StatusCode;
use serde::{Serialize, Serializer};

use crate::{ConsistencyLevel, Diagnostics, OperationType, ResourceType};

/// Everything recorded about one observed operation.
///
/// Ownership passes to the collector on [`collect`](super::TelemetryCollector::collect).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub container_id: String,
    pub database_id: String,
    #[serde(serialize_with = "serialize_status")]
    pub status_code: StatusCode,
    /// Response payload size in bytes, see [`payload_size`](super::payload_size).
    pub payload_size: u64,
    pub operation_type: OperationType,
    pub resource_type: ResourceType,
    /// `None` when no source reported a level.
    pub consistency_level: Option<ConsistencyLevel>,
    pub request_charge: f64,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}
