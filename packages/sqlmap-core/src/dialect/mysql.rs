//! MySQL dialect.

use chrono::{DateTime, Utc};
use sqlmap_types::{Kind, LineString, Point, RawJson, TypeInfo};
use uuid::Uuid;

use super::{quote_string, Dialect, JsonLeaf};
use crate::codec::CURRENT_TIMESTAMP;
use crate::config::EngineConfig;
use crate::error::{CompileError, InvalidOption};
use crate::schema::FieldDescriptor;

/// MySQL 8 dialect: backtick identifiers, `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn column_type(
        &self,
        field: &FieldDescriptor,
        config: &EngineConfig,
    ) -> Result<String, CompileError> {
        let ty = field.type_info().deref();
        let options = field.options();
        let invalid = |source: InvalidOption| CompileError::InvalidOption {
            column: field.name().to_string(),
            source,
        };

        if ty.is::<Vec<u8>>() {
            return Ok(match options.size().map_err(invalid)? {
                Some(n) => format!("VARBINARY({n})"),
                None => "LONGBLOB".to_string(),
            });
        }
        if ty.is::<DateTime<Utc>>() {
            return Ok("DATETIME(6)".to_string());
        }
        if ty.is::<Uuid>() {
            return Ok("BINARY(16)".to_string());
        }
        if ty.is::<RawJson>() {
            return Ok("JSON".to_string());
        }
        if ty.is::<Point>() || ty.is::<LineString>() {
            let base = if ty.is::<Point>() { "POINT" } else { "LINESTRING" };
            return Ok(match options.srid().map_err(invalid)? {
                Some(srid) => format!("{base} SRID {srid}"),
                None => base.to_string(),
            });
        }
        if ty.kind() == Kind::Array && ty.elem().is_some_and(|e| e.is::<String>()) {
            if let Some(members) = options.set_members().map_err(invalid)? {
                return Ok(format!("SET({})", quoted_list(&members)));
            }
        }

        match ty.kind() {
            Kind::Bool => Ok("TINYINT(1)".to_string()),
            Kind::Int | Kind::Uint => {
                let base = match ty.bits() {
                    8 => "TINYINT",
                    16 => "SMALLINT",
                    32 => "INT",
                    _ => "BIGINT",
                };
                if ty.kind() == Kind::Uint || options.unsigned {
                    Ok(format!("{base} UNSIGNED"))
                } else {
                    Ok(base.to_string())
                }
            }
            Kind::Float if ty.bits() == 32 => Ok("FLOAT".to_string()),
            Kind::Float => Ok("DOUBLE".to_string()),
            Kind::String => {
                if let Some(members) = options.enum_members().map_err(invalid)? {
                    return Ok(format!("ENUM({})", quoted_list(&members)));
                }
                if let Some(n) = options.char_size().map_err(invalid)? {
                    return Ok(format!("CHAR({n})"));
                }
                if options.longtext {
                    return Ok("LONGTEXT".to_string());
                }
                let size = options
                    .size()
                    .map_err(invalid)?
                    .unwrap_or(config.default_string_size);
                Ok(format!("VARCHAR({size})"))
            }
            Kind::Array | Kind::Map => Ok("JSON".to_string()),
            Kind::Struct if !ty.fields().is_empty() => Ok("JSON".to_string()),
            Kind::Struct | Kind::Option => Err(CompileError::UnsupportedType {
                column: field.name().to_string(),
                type_name: ty.name(),
            }),
        }
    }

    fn json_leaf_type(&self, leaf: JsonLeaf, config: &EngineConfig) -> String {
        match leaf {
            JsonLeaf::String => format!("VARCHAR({})", config.default_string_size),
            JsonLeaf::Integer => "BIGINT".to_string(),
            JsonLeaf::Float => "DOUBLE".to_string(),
            JsonLeaf::Bool => "TINYINT(1)".to_string(),
            JsonLeaf::Document => "JSON".to_string(),
        }
    }

    fn implicit_default(&self, ty: &TypeInfo) -> Option<&'static str> {
        ty.is::<DateTime<Utc>>().then_some(CURRENT_TIMESTAMP)
    }

    fn table_options(&self, config: &EngineConfig) -> String {
        format!(
            "ENGINE={} DEFAULT CHARSET={} COLLATE={}",
            config.table_engine, config.default_charset, config.default_collate
        )
    }
}

fn quoted_list(members: &[&str]) -> String {
    members
        .iter()
        .map(|m| quote_string(m))
        .collect::<Vec<_>>()
        .join(",")
}
