//! Conversion errors between host values and [`Value`](crate::Value) trees.

use thiserror::Error;

/// Error raised when a [`Value`](crate::Value) cannot be turned back into a host value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value variant does not match the host type.
    #[error("expected {expected} value, got {got}")]
    TypeMismatch {
        /// Expected value category.
        expected: &'static str,
        /// Variant that was found.
        got: &'static str,
    },

    /// A record value carries the wrong number of fields.
    #[error("record '{record}' expects {expected} fields, got {got}")]
    FieldCount {
        /// Record type name.
        record: &'static str,
        /// Declared field count.
        expected: usize,
        /// Field count of the value.
        got: usize,
    },

    /// A numeric value does not fit the host type.
    #[error("value {value} overflows {target}")]
    Overflow {
        /// Offending value rendered as text.
        value: String,
        /// Host type name.
        target: &'static str,
    },
}
