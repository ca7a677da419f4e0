//! Record-to-MySQL mapping core.
//!
//! Introspects record types into cached field schemas, converts field values
//! to and from SQL arguments through a codec registry, stores nested values
//! in JSON columns, and compiles a dialect-neutral statement algebra into
//! SQL text with positional arguments.
//!
//! ```
//! use sqlmap_core::expr::{equal, Select};
//! use sqlmap_core::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let stmt = engine
//!     .compile(Select::from("shop", "users").filter(equal("Age", 30u8)))
//!     .unwrap();
//! assert_eq!(stmt.sql(), "SELECT * FROM `shop`.`users` WHERE `Age` = ?");
//! assert_eq!(stmt.args().len(), 1);
//! ```

pub mod codec;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod expr;
pub mod jsonb;
pub mod schema;
pub mod stmt;

pub use codec::{CodecContext, CodecRegistry};
pub use config::EngineConfig;
pub use dialect::{Compiler, Dialect, MySqlDialect};
pub use engine::Engine;
pub use error::{
    CompileError, ConfigError, DecodeError, EncodeError, Error, JsonError, NoCodecError,
    SchemaError,
};
pub use expr::{LiveSchema, Statement, Table};
pub use schema::{FieldDescriptor, FieldOptions, SchemaCache, TypeSchema};
pub use stmt::{CompiledStatement, PooledStatement, StatementBuffer, StatementPool};

pub use sqlmap_types::{record, Kind, Reflect, SqlArgument, SqlValue, TypeInfo, Value};
