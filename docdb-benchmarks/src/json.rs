use std::sync::Arc;

use bytes::BufMut;
use serde::Serialize;

use crate::{BenchmarkError, BufferPool, PooledBuffer};

/// Serialize `value` as JSON into a buffer checked out of `pool`.
///
/// On failure the buffer has already gone back to the pool.
pub fn to_pooled_json<T>(pool: &Arc<BufferPool>, value: &T) -> Result<PooledBuffer, BenchmarkError>
where
    T: Serialize + ?Sized,
{
    let mut buffer = pool.checkout();
    serde_json::to_writer((&mut *buffer).writer(), value)?;
    Ok(buffer)
}
