//! Statement buffers and their pool.

mod buffer;
mod pool;

pub use buffer::{CompiledStatement, StatementBuffer};
pub use pool::{PooledStatement, StatementPool};
