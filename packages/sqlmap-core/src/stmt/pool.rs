//! Pool of reusable statement buffers.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use super::buffer::StatementBuffer;

/// Initial text capacity of freshly allocated buffers
const INITIAL_CAPACITY: usize = 256;

/// Bounded pool of idle [`StatementBuffer`]s.
///
/// `acquire` hands out a buffer by value inside a guard, so a buffer can
/// never be held by two callers. Dropping the guard resets the buffer and
/// keeps it for reuse while fewer than `capacity` buffers are idle.
#[derive(Debug)]
pub struct StatementPool {
    idle: Mutex<Vec<StatementBuffer>>,
    capacity: usize,
}

impl StatementPool {
    /// Creates an empty pool keeping at most `capacity` idle buffers.
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Takes an idle buffer or allocates a new one.
    pub fn acquire(&self) -> PooledStatement<'_> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let buffer = reused.unwrap_or_else(|| {
            trace!("Statement pool empty, allocating buffer");
            StatementBuffer::with_capacity(INITIAL_CAPACITY)
        });
        PooledStatement { pool: self, buffer }
    }

    fn release(&self, mut buffer: StatementBuffer) {
        buffer.reset();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.capacity {
            idle.push(buffer);
        }
    }

    /// Number of idle buffers.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A buffer checked out of a [`StatementPool`].
#[derive(Debug)]
pub struct PooledStatement<'a> {
    pool: &'a StatementPool,
    buffer: StatementBuffer,
}

impl PooledStatement<'_> {
    /// Moves the text and arguments out; the emptied buffer goes back to the pool.
    pub fn take(&mut self) -> StatementBuffer {
        std::mem::take(&mut self.buffer)
    }
}

impl Deref for PooledStatement<'_> {
    type Target = StatementBuffer;

    fn deref(&self) -> &StatementBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledStatement<'_> {
    fn deref_mut(&mut self) -> &mut StatementBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledStatement<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
