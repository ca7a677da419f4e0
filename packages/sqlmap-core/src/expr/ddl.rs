//! Schema definition statement shapes.

use std::sync::Arc;

use super::statement::Table;
use crate::schema::TypeSchema;

/// `CREATE TABLE` with one column per schema property.
#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table: Table,
    pub schema: Arc<TypeSchema>,
    pub if_not_exists: bool,
}

impl CreateTable {
    pub fn new(table: Table, schema: Arc<TypeSchema>) -> Self {
        Self {
            table,
            schema,
            if_not_exists: false,
        }
    }

    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

/// Column and index names of an existing table.
///
/// Fetched by running the [`ColumnsOf`] and [`IndexesOf`] queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSchema {
    /// Column names in ordinal order
    pub columns: Vec<String>,
    pub indexes: Vec<String>,
}

impl LiveSchema {
    pub fn new(columns: Vec<String>, indexes: Vec<String>) -> Self {
        Self { columns, indexes }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.iter().any(|i| i == name)
    }
}

/// `ALTER TABLE` bringing a live table in line with a record schema.
///
/// Columns are modified or added; live columns missing from the schema are
/// dropped only in unsafe mode.
#[derive(Debug, Clone)]
pub struct AlterTable {
    pub table: Table,
    pub schema: Arc<TypeSchema>,
    pub live: LiveSchema,
    pub unsafe_mode: bool,
}

impl AlterTable {
    pub fn new(table: Table, schema: Arc<TypeSchema>, live: LiveSchema) -> Self {
        Self {
            table,
            schema,
            live,
            unsafe_mode: false,
        }
    }

    /// Allows dropping live columns absent from the schema.
    #[must_use]
    pub fn unsafe_mode(mut self, enabled: bool) -> Self {
        self.unsafe_mode = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    pub table: Table,
    pub if_exists: bool,
}

impl DropTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            if_exists: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateTable {
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    pub from: Table,
    pub to: Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub table: Table,
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl CreateIndex {
    pub fn new<S: Into<String>>(
        table: Table,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            table,
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndex {
    pub table: Table,
    pub name: String,
}

/// Query returning one row when the table exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasTable {
    pub table: Table,
}

/// Query listing the table's column names in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnsOf {
    pub table: Table,
}

/// Query listing the table's distinct index names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexesOf {
    pub table: Table,
}
