use docdb_client::{BoxFuture, Diagnostics};

use crate::BenchmarkError;

/// A benchmarked operation.
///
/// `prepare` seeds the data the operation needs and runs its body at most
/// once per instance; later calls return immediately. `execute_once` is the
/// measured step and may be called any number of times. Both take `&mut self`,
/// so one instance can never be prepared from two callers at once.
pub trait BenchmarkOperation: Send {
    fn prepare(&mut self) -> BoxFuture<'_, Result<(), BenchmarkError>>;

    fn execute_once(&mut self) -> BoxFuture<'_, Result<OperationResult, BenchmarkError>>;
}

/// Outcome of one execution.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub database_name: String,
    pub container_name: String,
    /// Total request charge of the execution.
    pub ru_charges: f64,
    pub diagnostics: Option<Diagnostics>,
}

impl OperationResult {
    /// Render the diagnostics. Nothing is rendered before this is called.
    pub fn lazy_diagnostics(&self) -> Option<String> {
        self.diagnostics.as_ref().map(ToString::to_string)
    }
}
