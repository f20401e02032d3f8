//! Pooled encoding buffers.
//!
//! A [`PooledBuffer`] is checked out of a [`BufferPool`] and goes back when it
//! is released or dropped, on every exit path. A buffer has one owner for the
//! duration of one serialize/return cycle and must not be kept after release.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

const DEFAULT_BUFFER_CAPACITY: usize = 4 * 1024;
const DEFAULT_MAX_POOLED: usize = 16;

/// A pool of reusable byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<BytesMut>>,
    outstanding: AtomicUsize,
    buffer_capacity: usize,
    max_pooled: usize,
}

impl BufferPool {
    /// Create a pool handing out buffers of `buffer_capacity` bytes.
    pub fn new(buffer_capacity: usize) -> Arc<Self> {
        Self::with_limits(buffer_capacity, DEFAULT_MAX_POOLED)
    }

    /// Create a pool that keeps at most `max_pooled` idle buffers.
    pub fn with_limits(buffer_capacity: usize, max_pooled: usize) -> Arc<Self> {
        Arc::new(Self {
            buffers: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            buffer_capacity,
            max_pooled,
        })
    }

    /// Take a buffer out of the pool, allocating one if none is idle.
    pub fn checkout(self: &Arc<Self>) -> PooledBuffer {
        let buffer = self
            .buffers
            .lock()
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(self.buffer_capacity));
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        PooledBuffer {
            buffer,
            pool: Arc::clone(self),
        }
    }

    /// Number of idle buffers.
    pub fn available(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Number of buffers checked out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn give_back(&self, mut buffer: BytesMut) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        buffer.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_pooled {
            buffers.push(buffer);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_pooled: DEFAULT_MAX_POOLED,
        }
    }
}

/// A buffer checked out of a [`BufferPool`].
#[derive(Debug)]
pub struct PooledBuffer {
    buffer: BytesMut,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    /// Copy the written bytes into an owned, immutable buffer.
    ///
    /// The copy outlives the pooled buffer.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }

    /// Return the buffer to its pool.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.give_back(buffer);
    }
}
