//! Configuration loading and its effect on compiled SQL.

use pretty_assertions::assert_eq;

use sqlmap_core::{ConfigError, Engine, EngineConfig, Error, Table};

use super::helpers::{init_tracing, Post};

#[test]
fn test_config_document_drives_ddl() -> anyhow::Result<()> {
    init_tracing();
    let config = EngineConfig::from_json_str(
        r#"{
            "dialect": "MySQL",
            "default_string_size": 255,
            "default_charset": "latin1",
            "default_collate": "latin1_swedish_ci",
            "table_engine": "MyISAM"
        }"#,
    )?;
    let engine = Engine::new(config)?;
    assert_eq!(engine.dialect().name(), "mysql");

    let create = engine.create_table::<Post>(Table::new("", "posts"))?;
    let stmt = engine.compile(create)?;
    assert!(stmt.sql().starts_with("CREATE TABLE `posts` ("), "{}", stmt.sql());
    assert!(stmt.sql().contains("`Title` VARCHAR(255) NOT NULL"), "{}", stmt.sql());
    assert!(
        stmt.sql()
            .ends_with(") ENGINE=MyISAM DEFAULT CHARSET=latin1 COLLATE=latin1_swedish_ci"),
        "{}",
        stmt.sql()
    );
    Ok(())
}

#[test]
fn test_invalid_config_documents() {
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"default_string_size": 0}"#),
        Err(ConfigError::OutOfRange {
            field: "default_string_size",
            ..
        })
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{"schema_cache_capacity": "lots"}"#),
        Err(ConfigError::Parse(_))
    ));

    let config = EngineConfig::from_json_str(r#"{"dialect": "postgres"}"#).unwrap();
    assert_eq!(
        Engine::new(config).unwrap_err(),
        Error::Config(ConfigError::UnknownDialect("postgres".to_string()))
    );
}
