//! Schema definition statements.

use sqlmap_types::RawJson;

use super::compiler::Compiler;
use super::JsonLeaf;
use crate::error::{CompileError, InvalidOption};
use crate::expr::{AlterTable, CreateIndex, CreateTable, DropTable, Table};
use crate::jsonb::{JsonReader, Token};
use crate::schema::{FieldDescriptor, TypeSchema};
use crate::stmt::StatementBuffer;

/// One column of a table definition, generated columns included.
struct ColumnSpec {
    name: String,
    definition: String,
}

impl Compiler<'_> {
    pub(super) fn write_create_table(
        &self,
        create: &CreateTable,
        buf: &mut StatementBuffer,
    ) -> Result<(), CompileError> {
        let schema = &create.schema;
        let columns = self.column_specs(schema)?;

        buf.write_str("CREATE TABLE ");
        if create.if_not_exists {
            buf.write_str("IF NOT EXISTS ");
        }
        buf.write_str(&self.dialect.table_name(&create.table));
        buf.write_str(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_str(&column.definition);
        }
        if let Some(primary) = self.primary_key(schema) {
            buf.write_str(", ");
            buf.write_str(&primary);
        }
        for field in schema.properties().filter(|f| f.options().unique_index) {
            buf.write_str(", ");
            buf.write_str(&self.unique_index(field));
        }
        for field in schema.properties() {
            if let Some((_, constraint)) = self.foreign_key(&create.table, field)? {
                buf.write_str(", ");
                buf.write_str(&constraint);
            }
        }
        buf.write_str(") ");
        buf.write_str(&self.dialect.table_options(self.config));
        Ok(())
    }

    pub(super) fn write_alter_table(
        &self,
        alter: &AlterTable,
        buf: &mut StatementBuffer,
    ) -> Result<(), CompileError> {
        let schema = &alter.schema;
        let live = &alter.live;
        let columns = self.column_specs(schema)?;
        let mut clauses = Vec::with_capacity(columns.len());

        let mut previous: Option<&str> = None;
        for column in &columns {
            let verb = if live.has_column(&column.name) {
                "MODIFY COLUMN"
            } else {
                "ADD COLUMN"
            };
            let position = match previous {
                Some(prev) => format!("AFTER {}", self.dialect.quote(prev)),
                None => "FIRST".to_string(),
            };
            clauses.push(format!("{verb} {} {position}", column.definition));
            previous = Some(column.name.as_str());
        }

        if let Some(primary) = self.primary_key(schema) {
            if live.has_index("PRIMARY") {
                clauses.push("DROP PRIMARY KEY".to_string());
            }
            clauses.push(format!("ADD {primary}"));
        }
        for field in schema.properties().filter(|f| f.options().unique_index) {
            if !live.has_index(&unique_index_name(field)) {
                clauses.push(format!("ADD {}", self.unique_index(field)));
            }
        }
        for field in schema.properties() {
            if let Some((name, constraint)) = self.foreign_key(&alter.table, field)? {
                if !live.has_index(&name) {
                    clauses.push(format!("ADD {constraint}"));
                }
            }
        }

        if alter.unsafe_mode {
            for live_column in &live.columns {
                if !columns.iter().any(|c| &c.name == live_column) {
                    clauses.push(format!("DROP COLUMN {}", self.dialect.quote(live_column)));
                }
            }
        }

        buf.write_str("ALTER TABLE ");
        buf.write_str(&self.dialect.table_name(&alter.table));
        buf.write_byte(b' ');
        buf.write_str(&clauses.join(", "));
        Ok(())
    }

    pub(super) fn write_drop_table(&self, drop: &DropTable, buf: &mut StatementBuffer) {
        buf.write_str("DROP TABLE ");
        if drop.if_exists {
            buf.write_str("IF EXISTS ");
        }
        buf.write_str(&self.dialect.table_name(&drop.table));
    }

    pub(super) fn write_create_index(
        &self,
        create: &CreateIndex,
        buf: &mut StatementBuffer,
    ) -> Result<(), CompileError> {
        if create.columns.is_empty() {
            return Err(CompileError::Empty {
                part: "index columns",
            });
        }
        buf.write_str("CREATE ");
        if create.unique {
            buf.write_str("UNIQUE ");
        }
        buf.write_str("INDEX ");
        buf.write_str(&self.dialect.quote(&create.name));
        buf.write_str(" ON ");
        buf.write_str(&self.dialect.table_name(&create.table));
        buf.write_str(" (");
        self.write_identifiers(&create.columns, buf);
        buf.write_byte(b')');
        Ok(())
    }

    /// Column definitions in schema order. Generated columns follow the JSON
    /// column they are derived from.
    fn column_specs(&self, schema: &TypeSchema) -> Result<Vec<ColumnSpec>, CompileError> {
        if schema.property_count() == 0 {
            return Err(CompileError::Empty { part: "columns" });
        }
        let mut specs = Vec::with_capacity(schema.property_count());
        for field in schema.properties() {
            specs.push(ColumnSpec {
                name: field.name().to_string(),
                definition: self.dialect.column_definition(field, self.config)?,
            });
            self.flattened_columns(field, &mut specs)?;
            self.generated_columns(schema, field, &mut specs)?;
        }
        Ok(specs)
    }

    /// Generated columns for descendants of a JSON column that declare
    /// `virtual_column` or `stored_column`.
    fn generated_columns(
        &self,
        schema: &TypeSchema,
        parent: &FieldDescriptor,
        specs: &mut Vec<ColumnSpec>,
    ) -> Result<(), CompileError> {
        let parent_column = self.dialect.quote(parent.name());
        let prefix_len = parent.path().len() + 1;
        for field in schema.descendants(parent.id()) {
            let Some((generated, alias)) = field.options().generated() else {
                continue;
            };
            let name = if alias.is_empty() { field.name() } else { alias };
            let path = field.path().get(prefix_len..).unwrap_or(field.name());
            let mut definition = format!(
                "{} {} AS ({}) {}",
                self.dialect.quote(name),
                self.dialect.column_type(field, self.config)?,
                self.dialect.json_path(&parent_column, path, true),
                generated.keyword()
            );
            if let Some(comment) = &field.options().comment {
                definition.push_str(" COMMENT ");
                definition.push_str(&super::quote_string(comment));
            }
            specs.push(ColumnSpec {
                name: name.to_string(),
                definition,
            });
        }
        Ok(())
    }

    /// Virtual columns for every leaf of the JSON object default of a
    /// `generated_column` raw JSON field.
    fn flattened_columns(
        &self,
        field: &FieldDescriptor,
        specs: &mut Vec<ColumnSpec>,
    ) -> Result<(), CompileError> {
        let options = field.options();
        if !options.generated_column || !field.type_info().deref().is::<RawJson>() {
            return Ok(());
        }
        let invalid = |value: &str| CompileError::InvalidOption {
            column: field.name().to_string(),
            source: InvalidOption {
                option: "default",
                value: value.to_string(),
            },
        };
        let template = options.default.as_deref().ok_or_else(|| invalid(""))?;
        let mut reader = JsonReader::new(template.as_bytes());
        if reader.next_token().map_err(|_| invalid(template))? != Token::BeginObject {
            return Err(invalid(template));
        }

        let parent_column = self.dialect.quote(field.name());
        reader.read_flatten_object(|path, leaf| -> Result<(), CompileError> {
            let kind = match leaf.next_token()? {
                Token::String => JsonLeaf::String,
                Token::True | Token::False => JsonLeaf::Bool,
                Token::Number => {
                    let number = leaf.read_number()?;
                    if number.contains(['.', 'e', 'E']) {
                        JsonLeaf::Float
                    } else {
                        JsonLeaf::Integer
                    }
                }
                _ => JsonLeaf::Document,
            };
            let name = format!("{}_{}", field.name(), path.replace('.', "_"));
            let definition = format!(
                "{} {} AS ({}) VIRTUAL",
                self.dialect.quote(&name),
                self.dialect.json_leaf_type(kind, self.config),
                self.dialect.json_path(&parent_column, path, true)
            );
            specs.push(ColumnSpec { name, definition });
            Ok(())
        })?;
        reader.finish()?;
        Ok(())
    }

    fn primary_key(&self, schema: &TypeSchema) -> Option<String> {
        let keys: Vec<String> = schema
            .primary_keys()
            .map(|f| self.dialect.quote(f.name()))
            .collect();
        (!keys.is_empty()).then(|| format!("PRIMARY KEY ({})", keys.join(", ")))
    }

    fn unique_index(&self, field: &FieldDescriptor) -> String {
        format!(
            "UNIQUE INDEX {} ({})",
            self.dialect.quote(&unique_index_name(field)),
            self.dialect.quote(field.name())
        )
    }

    /// Constraint name and `CONSTRAINT ... FOREIGN KEY` clause of a field
    /// declaring `foreign_key=<table>:<column>`.
    fn foreign_key(
        &self,
        table: &Table,
        field: &FieldDescriptor,
    ) -> Result<Option<(String, String)>, CompileError> {
        let reference = field
            .options()
            .foreign_key()
            .map_err(|source| CompileError::InvalidOption {
                column: field.name().to_string(),
                source,
            })?;
        let Some((ref_table, ref_column)) = reference else {
            return Ok(None);
        };
        let target = match ref_table.split_once('.') {
            Some((database, name)) => Table::new(database, name),
            None => Table::new(table.database.as_str(), ref_table),
        };
        let name = format!("FK_{}_{}", table.name, field.name());
        let clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.dialect.quote(&name),
            self.dialect.quote(field.name()),
            self.dialect.table_name(&target),
            self.dialect.quote(ref_column)
        );
        Ok(Some((name, clause)))
    }
}

fn unique_index_name(field: &FieldDescriptor) -> String {
    format!("UX_{}", field.name())
}
