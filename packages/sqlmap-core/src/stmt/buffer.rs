//! SQL text plus bound arguments.

use std::fmt;
use std::time::{Duration, Instant};

use sqlmap_types::SqlValue;

/// A compiled statement handed to a driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// Mutable accumulator for SQL text and its positional arguments.
///
/// One buffer belongs to one compilation at a time. Buffers are normally
/// obtained from a [`StatementPool`](super::StatementPool).
#[derive(Debug, Default)]
pub struct StatementBuffer {
    sql: String,
    args: Vec<SqlValue>,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with preallocated text capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sql: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_byte(&mut self, b: u8) {
        self.sql.push(char::from(b));
    }

    /// Writes `placeholder` and appends `values` to the argument list.
    ///
    /// # Arguments
    /// * `placeholder` - Text written into the SQL, e.g. `?` or `(?,?)`
    /// * `values` - Arguments bound by that text, in order
    pub fn append_args<I>(&mut self, placeholder: &str, values: I)
    where
        I: IntoIterator<Item = SqlValue>,
    {
        self.sql.push_str(placeholder);
        self.args.extend(values);
    }

    /// Appends one argument without writing any text.
    pub fn push_arg(&mut self, value: SqlValue) {
        self.args.push(value);
    }

    /// Number of arguments bound so far.
    ///
    /// Dialects with numbered placeholders use `pos() + 1` for the next one.
    pub fn pos(&self) -> usize {
        self.args.len()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty() && self.args.is_empty()
    }

    /// Clears text, arguments and timing. Allocated capacity is kept.
    pub fn reset(&mut self) {
        self.sql.clear();
        self.args.clear();
        self.started = None;
        self.elapsed = None;
    }

    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
        self.elapsed = None;
    }

    /// Stops the timer and returns the measured duration.
    pub fn stop_timer(&mut self) -> Option<Duration> {
        let started = self.started.take()?;
        let elapsed = started.elapsed();
        self.elapsed = Some(elapsed);
        Some(elapsed)
    }

    /// Duration recorded by the last `stop_timer`.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Copies the text and arguments out of the buffer.
    pub fn to_compiled(&self) -> CompiledStatement {
        CompiledStatement {
            sql: self.sql.clone(),
            args: self.args.clone(),
        }
    }

    pub fn into_compiled(self) -> CompiledStatement {
        CompiledStatement {
            sql: self.sql,
            args: self.args,
        }
    }
}

impl fmt::Write for StatementBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sql.push_str(s);
        Ok(())
    }
}

impl fmt::Display for StatementBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
