//! SQL dialects and the statement compiler.
//!
//! A [`Dialect`] owns the textual rules of one SQL flavour: identifier
//! quoting, placeholders, operator tokens and column type mapping. The
//! [`Compiler`] walks statement shapes from [`crate::expr`] and writes SQL
//! text plus positional arguments into a [`StatementBuffer`].

mod compiler;
mod ddl;
mod mysql;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlmap_types::{Kind, RawJson, TypeInfo};

use crate::codec::CURRENT_TIMESTAMP;
use crate::config::EngineConfig;
use crate::error::{CompileError, ConfigError, InvalidOption};
use crate::expr::{Expr, Operator, Table};
use crate::schema::FieldDescriptor;
use crate::stmt::StatementBuffer;

pub use compiler::{escape_like, Compiler};
pub use mysql::MySqlDialect;

/// Shape of a JSON leaf that a flattened generated column is typed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLeaf {
    String,
    Integer,
    Float,
    Bool,
    /// Arrays and nulls
    Document,
}

/// Textual rules of one SQL flavour.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Dialect name as used in [`EngineConfig::dialect`].
    fn name(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote(&self, ident: &str) -> String;

    /// Writes the placeholder of the argument at 1-based position `pos`.
    fn write_placeholder(&self, buf: &mut StatementBuffer, _pos: usize) {
        buf.write_byte(b'?');
    }

    /// Fully qualified, quoted table name. The database part is omitted
    /// when empty.
    fn table_name(&self, table: &Table) -> String {
        if table.database.is_empty() {
            self.quote(&table.name)
        } else {
            format!("{}.{}", self.quote(&table.database), self.quote(&table.name))
        }
    }

    fn operator_token(&self, op: Operator) -> &'static str {
        op.token()
    }

    /// Whether the dialect can express this node. Only the node itself is
    /// inspected; children are checked as the compiler reaches them.
    fn supports(&self, _expr: &Expr) -> bool {
        true
    }

    /// Writes a JSON path extraction over an already quoted column.
    fn json_path(&self, column: &str, path: &str, unquote: bool) -> String {
        let arrow = if unquote { "->>" } else { "->" };
        format!("{column} {arrow} '$.{}'", path.replace('\'', "''"))
    }

    /// Column type of a field, e.g. `VARCHAR(191)`.
    fn column_type(
        &self,
        field: &FieldDescriptor,
        config: &EngineConfig,
    ) -> Result<String, CompileError>;

    /// Column type of a generated column over a JSON leaf.
    fn json_leaf_type(&self, leaf: JsonLeaf, config: &EngineConfig) -> String;

    /// Default written for non-null columns that declare none.
    fn implicit_default(&self, _ty: &TypeInfo) -> Option<&'static str> {
        None
    }

    /// Full column definition: name, type and column attributes.
    ///
    /// # Arguments
    /// * `field` - Column-level field
    /// * `config` - Engine configuration for size and charset defaults
    ///
    /// # Returns
    /// The definition text, or `CompileError` when the type has no mapping or
    /// an option cannot be applied.
    fn column_definition(
        &self,
        field: &FieldDescriptor,
        config: &EngineConfig,
    ) -> Result<String, CompileError> {
        let options = field.options();
        let ty = field.type_info().deref();
        let mut def = format!("{} {}", self.quote(field.name()), self.column_type(field, config)?);

        if let Some(charset) = &options.charset {
            def.push_str(" CHARACTER SET ");
            def.push_str(charset);
        }
        if let Some(collate) = &options.collate {
            def.push_str(" COLLATE ");
            def.push_str(collate);
        }
        def.push_str(if field.is_nullable() { " NULL" } else { " NOT NULL" });

        if options.auto_increment {
            if !ty.kind().is_integer() {
                return Err(CompileError::InvalidOption {
                    column: field.name().to_string(),
                    source: InvalidOption {
                        option: "auto_increment",
                        value: ty.name().to_string(),
                    },
                });
            }
            def.push_str(" AUTO_INCREMENT");
        }

        match &options.default {
            Some(value) => {
                let literal =
                    default_literal(&ty, value).map_err(|source| CompileError::InvalidOption {
                        column: field.name().to_string(),
                        source,
                    })?;
                def.push_str(" DEFAULT ");
                def.push_str(&literal);
            }
            None if !field.is_nullable() && !options.auto_increment => {
                if let Some(implicit) = self.implicit_default(&ty) {
                    def.push_str(" DEFAULT ");
                    def.push_str(implicit);
                }
            }
            None => {}
        }

        if let Some(comment) = &options.comment {
            def.push_str(" COMMENT ");
            def.push_str(&quote_string(comment));
        }
        Ok(def)
    }

    /// Table options written after the column list of `CREATE TABLE`.
    fn table_options(&self, config: &EngineConfig) -> String;
}

/// Resolves a dialect by its configured name.
pub fn dialect_by_name(name: &str) -> Result<Arc<dyn Dialect>, ConfigError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mysql" => Ok(Arc::new(MySqlDialect)),
        _ => Err(ConfigError::UnknownDialect(name.to_string())),
    }
}

/// Single-quoted SQL string literal.
pub(crate) fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

/// Current-time keywords accepted unquoted as a column default.
const TIME_KEYWORDS: [&str; 4] = ["CURRENT_TIMESTAMP", "NOW", "LOCALTIME", "LOCALTIMESTAMP"];

/// Renders a `default=` value for a column of type `ty`.
///
/// Numbers, booleans, `NULL`, time keywords and function calls are written
/// as is; string defaults are quoted unless already quoted; JSON defaults
/// become an expression default.
///
/// # Returns
/// The SQL literal, or `InvalidOption` for a boolean default that is not
/// `true`, `false`, `1` or `0`.
fn default_literal(ty: &TypeInfo, value: &str) -> Result<String, InvalidOption> {
    let upper = value.to_ascii_uppercase();
    if upper == "NULL" || value.ends_with(')') || value.starts_with('\'') {
        return Ok(value.to_string());
    }
    if ty.kind() != Kind::String && TIME_KEYWORDS.contains(&upper.as_str()) {
        // DATETIME(6) columns need the keyword at matching precision.
        if ty.is::<DateTime<Utc>>() {
            return Ok(CURRENT_TIMESTAMP.to_string());
        }
        return Ok(upper);
    }
    let json = ty.is::<RawJson>() || matches!(ty.kind(), Kind::Struct | Kind::Array | Kind::Map);
    let literal = match ty.kind() {
        Kind::Bool => match upper.as_str() {
            "TRUE" | "1" => "1".to_string(),
            "FALSE" | "0" => "0".to_string(),
            _ => {
                return Err(InvalidOption {
                    option: "default",
                    value: value.to_string(),
                })
            }
        },
        Kind::Int | Kind::Uint | Kind::Float if value.parse::<f64>().is_ok() => value.to_string(),
        _ if json && (value.starts_with('{') || value.starts_with('[')) => {
            format!("({})", quote_string(value))
        }
        _ => quote_string(value),
    };
    Ok(literal)
}
