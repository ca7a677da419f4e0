//! Engine configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of cached type schemas (at least 2)
    pub schema_cache_capacity: usize,
    /// Maximum number of idle statement buffers kept for reuse
    pub statement_pool_capacity: usize,
    /// SQL dialect name
    pub dialect: String,
    /// VARCHAR length used when a string column declares no size
    pub default_string_size: u32,
    /// Table character set
    pub default_charset: String,
    /// Table collation
    pub default_collate: String,
    /// Storage engine for created tables
    pub table_engine: String,
    /// Allow ALTER TABLE to drop columns missing from the record
    pub unsafe_migrations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_cache_capacity: 128,
            statement_pool_capacity: 64,
            dialect: "mysql".to_string(),
            default_string_size: 191, // utf8mb4 index prefix limit
            default_charset: "utf8mb4".to_string(),
            default_collate: "utf8mb4_unicode_ci".to_string(),
            table_engine: "INNODB".to_string(),
            unsafe_migrations: false,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document. Missing keys take their defaults.
    ///
    /// # Arguments
    /// * `text` - JSON object text
    ///
    /// # Returns
    /// The validated configuration, or `ConfigError` on parse or range failure.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks setting ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_cache_capacity < 2 {
            return Err(ConfigError::OutOfRange {
                field: "schema_cache_capacity",
                value: self.schema_cache_capacity,
                min: 2,
            });
        }
        if self.default_string_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "default_string_size",
                value: 0,
                min: 1,
            });
        }
        if self.dialect.trim().is_empty() {
            return Err(ConfigError::UnknownDialect(self.dialect.clone()));
        }
        Ok(())
    }
}
