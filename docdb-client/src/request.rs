//! Request types for the handler pipeline.
//!
//! A [`RequestMessage`] describes one logical operation against the service.
//! It is built by the caller, then handed to the pipeline by shared reference,
//! so no handler can change it once it has been dispatched.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::RequestOptions;

/// The category of database entity a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Database,
    Container,
    Item,
    StoredProcedure,
    Trigger,
    UserDefinedFunction,
    PartitionKeyRange,
    Offer,
}

impl ResourceType {
    /// Get the string representation of this resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Database => "Database",
            ResourceType::Container => "Container",
            ResourceType::Item => "Item",
            ResourceType::StoredProcedure => "StoredProcedure",
            ResourceType::Trigger => "Trigger",
            ResourceType::UserDefinedFunction => "UserDefinedFunction",
            ResourceType::PartitionKeyRange => "PartitionKeyRange",
            ResourceType::Offer => "Offer",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of operation a request performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Create,
    Read,
    Replace,
    Upsert,
    Delete,
    Patch,
    Query,
    ReadFeed,
    Batch,
    ExecuteStoredProcedure,
}

impl OperationType {
    /// Get the string representation of this operation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "Create",
            OperationType::Read => "Read",
            OperationType::Replace => "Replace",
            OperationType::Upsert => "Upsert",
            OperationType::Delete => "Delete",
            OperationType::Patch => "Patch",
            OperationType::Query => "Query",
            OperationType::ReadFeed => "ReadFeed",
            OperationType::Batch => "Batch",
            OperationType::ExecuteStoredProcedure => "ExecuteStoredProcedure",
        }
    }

    /// Returns true for operations that only read state.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            OperationType::Read | OperationType::Query | OperationType::ReadFeed
        )
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing operation.
///
/// # Example
///
/// ```
/// use docdb_client::{OperationType, RequestMessage, ResourceType};
///
/// let request = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "players")
///     .with_item_id("player-1")
///     .with_partition_key("eu-west");
///
/// assert_eq!(request.container_id(), "players");
/// assert_eq!(request.item_id(), Some("player-1"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestMessage {
    resource_type: ResourceType,
    operation_type: OperationType,
    database_id: String,
    container_id: String,
    item_id: Option<String>,
    partition_key: Option<String>,
    continuation: Option<String>,
    max_item_count: Option<u32>,
    options: RequestOptions,
    activity_id: Uuid,
    body: Option<Bytes>,
}

impl RequestMessage {
    /// Create a request with a fresh activity id.
    pub fn new(
        resource_type: ResourceType,
        operation_type: OperationType,
        database_id: impl Into<String>,
        container_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            operation_type,
            database_id: database_id.into(),
            container_id: container_id.into(),
            item_id: None,
            partition_key: None,
            continuation: None,
            max_item_count: None,
            options: RequestOptions::default(),
            activity_id: Uuid::new_v4(),
            body: None,
        }
    }

    /// Set the target item id.
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Set the partition key value.
    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    /// Set the continuation token of a paged read.
    pub fn with_continuation(mut self, continuation: impl Into<String>) -> Self {
        self.continuation = Some(continuation.into());
        self
    }

    /// Set the maximum number of items per page.
    pub fn with_max_item_count(mut self, max_item_count: u32) -> Self {
        self.max_item_count = Some(max_item_count);
        self
    }

    /// Set per-request options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the request payload.
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Copy of this request under a new activity id, for follow-up pages.
    pub(crate) fn renewed(&self) -> Self {
        Self {
            activity_id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn continuation(&self) -> Option<&str> {
        self.continuation.as_deref()
    }

    pub fn max_item_count(&self) -> Option<u32> {
        self.max_item_count
    }

    /// Per-request options, including the consistency override.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Identifier correlating this request with service-side logs.
    pub fn activity_id(&self) -> Uuid {
        self.activity_id
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::ConsistencyLevel;

    #[test]
    fn test_request_builder() {
        let request = RequestMessage::new(ResourceType::Item, OperationType::Query, "db", "coll")
            .with_partition_key("pk")
            .with_continuation("token")
            .with_max_item_count(1)
            .with_options(RequestOptions::new().consistency_level(ConsistencyLevel::Eventual))
            .with_body(Bytes::from_static(b"{}"));

        assert_eq!(request.resource_type(), ResourceType::Item);
        assert_eq!(request.operation_type(), OperationType::Query);
        assert_eq!(request.database_id(), "db");
        assert_eq!(request.partition_key(), Some("pk"));
        assert_eq!(request.continuation(), Some("token"));
        assert_eq!(request.max_item_count(), Some(1));
        assert_eq!(
            request.options().get_consistency_level(),
            Some(ConsistencyLevel::Eventual)
        );
        assert_eq!(request.body().unwrap().as_ref(), b"{}");
    }

    #[test]
    fn test_activity_ids_are_unique() {
        let a = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "c");
        let b = RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "c");
        assert_ne!(a.activity_id(), b.activity_id());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ResourceType::Item.to_string(), "Item");
        assert_eq!(OperationType::ReadFeed.to_string(), "ReadFeed");
        assert!(OperationType::Query.is_read_only());
        assert!(!OperationType::Create.is_read_only());
    }

    #[test]
    fn test_resource_type_serde() {
        let json = serde_json::to_string(&ResourceType::Item).unwrap();
        assert_eq!(json, "\"Item\"");
        let parsed: OperationType = serde_json::from_str("\"Create\"").unwrap();
        assert_eq!(parsed, OperationType::Create);
    }
}
