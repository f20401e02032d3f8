//! Item operations on one container.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::feed::PipelineFeed;
use crate::pipeline::Pipeline;
use crate::{
    CancellationToken, ClientError, OperationType, QueryRequestOptions, RequestMessage,
    RequestOptions, ResourceType, ResponseMessage,
};

/// A SQL query with named parameters.
///
/// # Example
///
/// ```
/// use docdb_client::QueryDefinition;
///
/// let query = QueryDefinition::new("select * from T where T.playerId = @id")
///     .with_parameter("@id", "a067ff");
///
/// assert_eq!(query.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    query: String,
    #[serde(default)]
    parameters: Vec<QueryParameter>,
}

/// One named query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: serde_json::Value,
}

impl QueryDefinition {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Vec::new(),
        }
    }

    /// Bind `name` to `value`. A later binding of the same name replaces it.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(QueryParameter { name, value }),
        }
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }
}

/// Stream-level item operations against one container.
///
/// Every operation becomes one [`RequestMessage`] sent through the pipeline;
/// responses are returned as-is, whatever their status.
#[derive(Debug, Clone)]
pub struct ContainerClient {
    pipeline: Pipeline,
    database_id: String,
    container_id: String,
}

impl ContainerClient {
    pub fn new(pipeline: Pipeline, database_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            pipeline,
            database_id: database_id.into(),
            container_id: container_id.into(),
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn item_request(&self, operation_type: OperationType) -> RequestMessage {
        RequestMessage::new(
            ResourceType::Item,
            operation_type,
            self.database_id.as_str(),
            self.container_id.as_str(),
        )
    }

    /// Create an item from an already serialized body.
    pub async fn create_item_stream(
        &self,
        body: Bytes,
        partition_key: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<ResponseMessage, ClientError> {
        self.create_item_stream_with_options(body, partition_key, RequestOptions::default(), cancel)
            .await
    }

    /// Create an item with per-request options.
    pub async fn create_item_stream_with_options(
        &self,
        body: Bytes,
        partition_key: impl Into<String>,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<ResponseMessage, ClientError> {
        let request = self
            .item_request(OperationType::Create)
            .with_partition_key(partition_key)
            .with_options(options)
            .with_body(body);
        self.pipeline.send(&request, cancel).await
    }

    /// Read one item.
    pub async fn read_item_stream(
        &self,
        id: impl Into<String>,
        partition_key: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<ResponseMessage, ClientError> {
        let request = self
            .item_request(OperationType::Read)
            .with_item_id(id)
            .with_partition_key(partition_key);
        self.pipeline.send(&request, cancel).await
    }

    /// Start a paged query.
    ///
    /// Nothing is sent until the first page is read from the returned feed.
    pub fn query_items_stream(
        &self,
        query: &QueryDefinition,
        options: QueryRequestOptions,
    ) -> Result<PipelineFeed, ClientError> {
        let body = serde_json::to_vec(query)?;
        let mut request = self
            .item_request(OperationType::Query)
            .with_options(options.request_options())
            .with_body(Bytes::from(body));
        if let Some(max_item_count) = options.get_max_item_count() {
            request = request.with_max_item_count(max_item_count);
        }
        if let Some(partition_key) = options.get_partition_key() {
            request = request.with_partition_key(partition_key);
        }
        Ok(PipelineFeed::new(self.pipeline.clone(), request))
    }
}
