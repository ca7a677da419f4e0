//! Engine context tying configuration, schemas, codecs, dialect and pool
//! together.

use std::sync::Arc;

use sqlmap_types::{Reflect, SqlArgument, SqlValue, Value};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::codec::{CodecContext, CodecRegistry};
use crate::config::EngineConfig;
use crate::dialect::{dialect_by_name, Compiler, Dialect};
use crate::error::{DecodeError, Error, SchemaError};
use crate::expr::{AlterTable, CreateTable, Expr, Insert, InsertMode, LiveSchema, Statement, Table};
use crate::schema::{SchemaCache, TypeSchema, EMPTY_OPTIONS};
use crate::stmt::{PooledStatement, StatementPool};

/// Owns everything needed to map records and compile statements.
///
/// An engine is `Send + Sync` and meant to be shared; every registry inside
/// it synchronizes internally.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    schemas: SchemaCache,
    codecs: CodecRegistry,
    dialect: Arc<dyn Dialect>,
    pool: StatementPool,
}

impl Engine {
    /// Creates an engine with the built-in codecs and the configured dialect.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    ///
    /// # Returns
    /// The engine, or `ConfigError` for invalid settings or an unknown
    /// dialect name.
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        let dialect = dialect_by_name(&config.dialect)?;
        Self::with_dialect(config, dialect)
    }

    /// Creates an engine with a caller supplied dialect. The configured
    /// dialect name is ignored.
    pub fn with_dialect(config: EngineConfig, dialect: Arc<dyn Dialect>) -> Result<Self, Error> {
        config.validate()?;
        let schemas = SchemaCache::new(config.schema_cache_capacity)?;
        let pool = StatementPool::new(config.statement_pool_capacity);
        debug!(
            "Engine ready: dialect {}, schema cache {}, statement pool {}",
            dialect.name(),
            config.schema_cache_capacity,
            config.statement_pool_capacity
        );
        Ok(Self {
            config,
            schemas,
            codecs: CodecRegistry::with_defaults(),
            dialect,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Codec registry; custom codecs may be registered at any time.
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn pool(&self) -> &StatementPool {
        &self.pool
    }

    pub fn compiler(&self) -> Compiler<'_> {
        Compiler::new(self.dialect.as_ref(), &self.codecs, &self.schemas, &self.config)
    }

    /// Schema of a record type, built on first use.
    pub fn schema_of<T: Reflect>(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        self.schemas.get_or_build::<T>()
    }

    /// Compiles a statement into a pooled buffer.
    ///
    /// # Arguments
    /// * `stmt` - Any statement shape
    ///
    /// # Returns
    /// A `PooledStatement` exposing `sql()` and `args()`; the buffer returns
    /// to the pool when it is dropped.
    pub fn compile(&self, stmt: impl Into<Statement>) -> Result<PooledStatement<'_>, Error> {
        let stmt = stmt.into();
        let mut buf = self.pool.acquire();
        self.compiler().compile(&stmt, &mut buf)?;
        Ok(buf)
    }

    /// `CREATE TABLE` for a record type.
    pub fn create_table<T: Reflect>(&self, table: Table) -> Result<CreateTable, Error> {
        Ok(CreateTable::new(table, self.schema_of::<T>()?))
    }

    /// `ALTER TABLE` migrating a live table to a record type. Columns are
    /// dropped only when `unsafe_migrations` is enabled.
    pub fn alter_table<T: Reflect>(&self, table: Table, live: LiveSchema) -> Result<AlterTable, Error> {
        Ok(AlterTable::new(table, self.schema_of::<T>()?, live)
            .unsafe_mode(self.config.unsafe_migrations))
    }

    /// Value tree of a record with nil UUID columns replaced by fresh v4 ids.
    pub fn prepare_record<T: Reflect>(&self, record: &T) -> Result<Value, Error> {
        let schema = self.schema_of::<T>()?;
        let mut root = record.to_value();
        for field in schema.properties() {
            if !matches!(field.value_in(&root), Some(Value::Uuid(id)) if id.is_nil()) {
                continue;
            }
            if let Some(slot) = schema.slot_mut(&mut root, field.id()) {
                let id = Uuid::new_v4();
                trace!("Generated id {} for column '{}'", id, field.name());
                *slot = Value::Uuid(id);
            }
        }
        Ok(root)
    }

    /// Encodes every column of a record, in schema order.
    ///
    /// # Returns
    /// `(column, argument)` pairs, or `EncodeError` from the first column
    /// that fails.
    pub fn encode_record<T: Reflect>(&self, record: &T) -> Result<Vec<(String, SqlArgument)>, Error> {
        let schema = self.schema_of::<T>()?;
        let root = self.prepare_record(record)?;
        let root_ty = T::type_info();
        let base = CodecContext::new(&self.codecs, &self.schemas, &root_ty, &EMPTY_OPTIONS);

        let null = Value::Null;
        let mut columns = Vec::with_capacity(schema.property_count());
        for field in schema.properties() {
            let value = field.value_in(&root).unwrap_or(&null);
            let arg = base.with_field(field).encode(value)?;
            columns.push((field.name().to_string(), arg));
        }
        Ok(columns)
    }

    /// `INSERT` of one row per record, columns in schema order.
    pub fn insert<T: Reflect>(
        &self,
        table: Table,
        records: &[T],
        mode: InsertMode,
    ) -> Result<Insert, Error> {
        let schema = self.schema_of::<T>()?;
        let mut insert = Insert::into_table(table.database, table.name)
            .mode(mode)
            .columns(schema.properties().map(|f| f.name().to_string()));
        for record in records {
            let row = self.encode_record(record)?;
            insert = insert.values(row.into_iter().map(|(_, arg)| Expr::Arg(arg)));
        }
        Ok(insert)
    }

    /// Decodes one result row into a record.
    ///
    /// # Arguments
    /// * `columns` - Column names of the result set
    /// * `row` - Wire values, one per column
    ///
    /// # Returns
    /// The record. Columns without a matching field are skipped; fields
    /// without a column keep their zero value.
    pub fn decode_row<T: Reflect>(&self, columns: &[&str], row: Vec<SqlValue>) -> Result<T, Error> {
        if columns.len() != row.len() {
            return Err(DecodeError::RowShape {
                columns: columns.len(),
                values: row.len(),
            }
            .into());
        }
        let schema = self.schema_of::<T>()?;
        let root_ty = T::type_info();
        let base = CodecContext::new(&self.codecs, &self.schemas, &root_ty, &EMPTY_OPTIONS);

        let mut root = root_ty.zero_value();
        for (column, wire) in columns.iter().zip(row) {
            let Some(field) = schema.property(column) else {
                trace!("Skipping unknown column '{}' for {}", column, schema.name());
                continue;
            };
            // Keeps unset optional records unset
            if wire.is_null() && field.is_nullable() {
                continue;
            }
            let value = base.with_field(field).decode(&wire)?;
            if let Some(slot) = schema.slot_mut(&mut root, field.id()) {
                *slot = value;
            }
        }
        Ok(T::from_value(root)?)
    }
}
