//! Single-partition query over a streamed feed.

use std::sync::Arc;

use docdb_client::{
    BoxFuture, CancellationToken, ClientError, ContainerClient, Pipeline, QueryDefinition,
    QueryRequestOptions, drain_feed,
};
use http::StatusCode;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{BenchmarkError, BenchmarkOperation, BufferPool, OperationResult, to_pooled_json};

const QUERY: &str = "select * from T where T.playerId = @id";
const QUERY_PLAYER_ID: &str = "a067ff";
const SEEDED_ITEMS: usize = 2;

/// Queries one partition with a page size of one item.
///
/// Construction picks a fresh partition key for the instance. `prepare`
/// creates two items in that partition, each under a freshly generated id.
/// Every execution queries the partition and drains the whole feed.
pub struct QueryStreamSinglePkOperation {
    container: ContainerClient,
    partition_key_path: String,
    sample: Map<String, Value>,
    execution_partition_key: String,
    created_item_ids: Vec<String>,
    pool: Arc<BufferPool>,
    cancel: CancellationToken,
    initialized: bool,
}

impl QueryStreamSinglePkOperation {
    /// Create the operation.
    ///
    /// `partition_key_path` is given in path form (`/pk`); `sample_json` must
    /// be a JSON object and is used as the template of every seeded item.
    pub fn new(
        pipeline: Pipeline,
        database_name: impl Into<String>,
        container_name: impl Into<String>,
        partition_key_path: &str,
        sample_json: &str,
    ) -> Result<Self, BenchmarkError> {
        let mut sample = match serde_json::from_str::<Value>(sample_json)? {
            Value::Object(map) => map,
            other => {
                return Err(BenchmarkError::InvalidSample(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };

        let partition_key_path = partition_key_path.replace('/', "");
        let execution_partition_key = Uuid::new_v4().to_string();
        sample.insert(
            partition_key_path.clone(),
            Value::String(execution_partition_key.clone()),
        );

        Ok(Self {
            container: ContainerClient::new(pipeline, database_name, container_name),
            partition_key_path,
            sample,
            execution_partition_key,
            created_item_ids: Vec::with_capacity(SEEDED_ITEMS),
            pool: BufferPool::new(4 * 1024),
            cancel: CancellationToken::new(),
            initialized: false,
        })
    }

    /// Use `cancel` for every operation issued from now on.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Serialize seeded items through `pool`.
    pub fn with_buffer_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn partition_key_path(&self) -> &str {
        &self.partition_key_path
    }

    pub fn execution_partition_key(&self) -> &str {
        &self.execution_partition_key
    }

    /// Ids of the items created by `prepare`, in creation order.
    pub fn created_item_ids(&self) -> &[String] {
        &self.created_item_ids
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn create_sample_item(&mut self) -> Result<(), BenchmarkError> {
        let id = Uuid::new_v4().to_string();
        self.sample.insert("id".to_owned(), Value::String(id.clone()));

        let buffer = to_pooled_json(&self.pool, &self.sample)?;
        let result = self
            .container
            .create_item_stream(
                buffer.to_bytes(),
                self.execution_partition_key.clone(),
                &self.cancel,
            )
            .await;
        buffer.release();

        let response = result?;
        if response.status() != StatusCode::CREATED {
            return Err(ClientError::status(
                response.status(),
                format!("create failed with status code: {}", response.status()),
            )
            .into());
        }

        tracing::debug!(
            id = %id,
            partition_key = %self.execution_partition_key,
            request_charge = response.headers().request_charge(),
            "seeded item"
        );
        self.created_item_ids.push(id);
        Ok(())
    }

    async fn run_query(&self) -> Result<OperationResult, BenchmarkError> {
        let query = QueryDefinition::new(QUERY).with_parameter("@id", QUERY_PLAYER_ID);
        let options = QueryRequestOptions::new()
            .max_item_count(1)
            .partition_key(self.execution_partition_key.as_str());

        let mut feed = self.container.query_items_stream(&query, options)?;
        let summary = drain_feed(&mut feed, &self.cancel).await?;

        Ok(OperationResult {
            database_name: self.container.database_id().to_owned(),
            container_name: self.container.container_id().to_owned(),
            ru_charges: summary.total_charge,
            diagnostics: summary.first_diagnostics,
        })
    }
}

impl BenchmarkOperation for QueryStreamSinglePkOperation {
    fn prepare(&mut self) -> BoxFuture<'_, Result<(), BenchmarkError>> {
        Box::pin(async move {
            if self.initialized {
                return Ok(());
            }

            for _ in 0..SEEDED_ITEMS {
                self.create_sample_item().await?;
            }

            self.initialized = true;
            Ok(())
        })
    }

    fn execute_once(&mut self) -> BoxFuture<'_, Result<OperationResult, BenchmarkError>> {
        Box::pin(self.run_query())
    }
}

impl std::fmt::Debug for QueryStreamSinglePkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryStreamSinglePkOperation")
            .field("container", &self.container)
            .field("partition_key_path", &self.partition_key_path)
            .field("execution_partition_key", &self.execution_partition_key)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
