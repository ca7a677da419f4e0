//! Error types.

use sqlmap_types::{Kind, ValueError};
use thiserror::Error;

/// Schema introspection and cache errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Only record types can be mapped to tables
    #[error("Type '{type_name}' is not a record (kind {kind})")]
    NotARecord { type_name: &'static str, kind: Kind },

    /// Cache capacity below the minimum of 2
    #[error("Schema cache capacity must be at least 2, got {capacity}")]
    InvalidCapacity { capacity: usize },
}

/// No encoder or decoder is registered for a type or its kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No codec registered for type '{type_name}'")]
pub struct NoCodecError {
    pub type_name: String,
}

/// An annotation option carries a value its consumer cannot use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value '{value}' for option '{option}'")]
pub struct InvalidOption {
    pub option: &'static str,
    pub value: String,
}

/// Errors raised while reading or writing the JSON column format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    /// A character that the current operation cannot accept
    #[error("{op}: unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar {
        op: &'static str,
        ch: char,
        offset: usize,
    },

    /// Input ended in the middle of a value
    #[error("{op}: unexpected end of input")]
    UnexpectedEof { op: &'static str },

    /// Malformed backslash escape inside a string
    #[error("Invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    /// Number literal that does not follow the JSON grammar
    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    /// String content is not valid UTF-8
    #[error("Invalid UTF-8 in string starting at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// NaN and infinities have no JSON representation
    #[error("Non-finite number {value} cannot be written")]
    NonFinite { value: f64 },

    /// Containers nested deeper than the reader accepts
    #[error("{op}: nesting exceeds {max} levels at offset {offset}")]
    TooDeep {
        op: &'static str,
        max: usize,
        offset: usize,
    },
}

/// Errors raised while converting a host value into a SQL argument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error(transparent)]
    NoCodec(#[from] NoCodecError),

    /// Value does not fit the target column type
    #[error("Value {value} overflows {target}")]
    Overflow { value: String, target: String },

    /// String is not a member of the declared enum
    #[error("Value '{value}' is not a member of enum ({members})")]
    InvalidEnum { value: String, members: String },

    /// Set element is not a member of the declared set
    #[error("Value '{value}' is not a member of set ({members})")]
    InvalidSet { value: String, members: String },

    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),

    /// NaN and infinities cannot be stored
    #[error("Non-finite number {value} cannot be encoded")]
    NonFinite { value: f64 },

    /// Value shape does not match the declared type
    #[error("Cannot encode {got} value as {expected}")]
    Unsupported {
        expected: &'static str,
        got: &'static str,
    },

    /// Custom marshaler failure
    #[error("Marshaling '{type_name}' failed: {message}")]
    Marshal {
        type_name: &'static str,
        message: String,
    },

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while converting a wire value back into a host value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    NoCodec(#[from] NoCodecError),

    /// Wire value does not fit the target bit width
    #[error("Value {value} overflows {target}")]
    Overflow { value: String, target: &'static str },

    /// Wire value cannot be parsed as the target type
    #[error("Invalid value '{value}' for {target}")]
    InvalidValue { value: String, target: &'static str },

    /// Wire representation the target cannot be built from
    #[error("Cannot decode {wire} into {target}")]
    Unsupported {
        wire: &'static str,
        target: &'static str,
    },

    /// Custom unmarshaler failure
    #[error("Unmarshaling '{type_name}' failed: {message}")]
    Marshal {
        type_name: &'static str,
        message: String,
    },

    /// Row and column lists differ in length
    #[error("Row has {values} values for {columns} columns")]
    RowShape { columns: usize, values: usize },

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while compiling a statement into SQL text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Expression node the active dialect cannot express
    #[error("Expression '{node}' is not supported by dialect '{dialect}'")]
    Unsupported {
        node: &'static str,
        dialect: &'static str,
    },

    /// Field type without a column type mapping
    #[error("Column '{column}' has unsupported data type '{type_name}'")]
    UnsupportedType {
        column: String,
        type_name: &'static str,
    },

    /// Annotation option the compiler cannot use
    #[error("Column '{column}': {source}")]
    InvalidOption {
        column: String,
        #[source]
        source: InvalidOption,
    },

    /// Field name not present in the record schema
    #[error("Field '{field}' not found in '{record}'")]
    UnknownField { field: String, record: &'static str },

    /// Statement part that must not be empty
    #[error("Statement has no {part}")]
    Empty { part: &'static str },

    /// Raw SQL placeholders and arguments disagree
    #[error("Raw SQL has {expected} placeholders but {got} arguments")]
    RawArgs { expected: usize, got: usize },

    /// Inserted row width differs from the column list
    #[error("Row has {values} values for {columns} columns")]
    ColumnCount { columns: usize, values: usize },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Json(#[from] JsonError),
}

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Numeric setting below its minimum
    #[error("Setting '{field}' must be at least {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
    },

    /// No dialect registered under this name
    #[error("Unknown dialect '{0}'")]
    UnknownDialect(String),

    /// Configuration document could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(String),
}

/// Top-level error wrapping every failure the crate reports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    NoCodec(#[from] NoCodecError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Value(#[from] ValueError),
}
