//! Client, request and telemetry options.
//!
//! All option types are plain values with builder-style setters. They also
//! implement serde so they can be loaded from JSON configuration:
//!
//! ```
//! use docdb_client::{ClientOptions, ConsistencyLevel, ResourceType};
//!
//! let options: ClientOptions = serde_json::from_str(r#"{
//!     "consistencyLevel": "Session",
//!     "telemetry": { "enabled": true, "allowedResourceTypes": ["Item", "Container"] }
//! }"#).unwrap();
//!
//! assert_eq!(options.get_consistency_level(), Some(ConsistencyLevel::Session));
//! assert!(options.telemetry().is_allowed(ResourceType::Container));
//! ```

use serde::{Deserialize, Serialize};

use crate::consistency::ConsistencyLevel;
use crate::request::ResourceType;

/// Client-wide options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientOptions {
    /// Client-level consistency, used when a request carries no override.
    pub(crate) consistency_level: Option<ConsistencyLevel>,
    /// Telemetry collection settings.
    pub(crate) telemetry: TelemetryOptions,
}

impl ClientOptions {
    /// Create default client options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client-level consistency.
    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    /// Set telemetry options.
    pub fn telemetry_options(mut self, telemetry: TelemetryOptions) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Get the client-level consistency, if any.
    pub fn get_consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }

    /// Get the telemetry options.
    pub fn telemetry(&self) -> &TelemetryOptions {
        &self.telemetry
    }
}

/// Telemetry collection settings.
///
/// By default telemetry is enabled for item operations only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryOptions {
    pub(crate) enabled: bool,
    pub(crate) allowed_resource_types: Vec<ResourceType>,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_resource_types: vec![ResourceType::Item],
        }
    }
}

impl TelemetryOptions {
    /// Create default telemetry options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Telemetry options with collection switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Enable or disable collection.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replace the set of resource types that are observed.
    pub fn allowed_resource_types(mut self, types: impl IntoIterator<Item = ResourceType>) -> Self {
        self.allowed_resource_types = types.into_iter().collect();
        self
    }

    /// Whether collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether operations on `resource_type` are observed.
    pub fn is_allowed(&self, resource_type: ResourceType) -> bool {
        self.enabled && self.allowed_resource_types.contains(&resource_type)
    }

    /// The observed resource types.
    pub fn get_allowed_resource_types(&self) -> &[ResourceType] {
        &self.allowed_resource_types
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    pub(crate) consistency_level: Option<ConsistencyLevel>,
}

impl RequestOptions {
    /// Create default request options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the consistency level for this request.
    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    /// Get the per-request consistency override, if any.
    pub fn get_consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }
}

/// Options for a paged query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryRequestOptions {
    pub(crate) max_item_count: Option<u32>,
    pub(crate) partition_key: Option<String>,
    pub(crate) consistency_level: Option<ConsistencyLevel>,
}

impl QueryRequestOptions {
    /// Create default query options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of items returned per page.
    pub fn max_item_count(mut self, max_item_count: u32) -> Self {
        self.max_item_count = Some(max_item_count);
        self
    }

    /// Scope the query to a single partition.
    pub fn partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    /// Override the consistency level for every page of the query.
    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    pub fn get_max_item_count(&self) -> Option<u32> {
        self.max_item_count
    }

    pub fn get_partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn get_consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }

    /// The per-request options each page request carries.
    pub(crate) fn request_options(&self) -> RequestOptions {
        RequestOptions {
            consistency_level: self.consistency_level,
        }
    }
}
