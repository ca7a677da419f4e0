//! Statement compilation through the engine.

use pretty_assertions::assert_eq;

use sqlmap_core::expr::{
    and, count_all, desc, equal, greater_than, in_, json_unquote, like, or, Delete, Insert,
    InsertMode, Select, Update,
};
use sqlmap_core::{CompileError, Error, LiveSchema, SqlValue, Table};

use super::helpers::{engine, Post, User};

#[test]
fn test_select_binds_condition_value() {
    let engine = engine();
    let stmt = engine
        .compile(Select::from("db", "t").filter(equal("A", 1i32)))
        .unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM `db`.`t` WHERE `A` = ?");
    assert_eq!(stmt.args(), &[SqlValue::Int(1)]);
}

#[test]
fn test_like_pattern_is_escaped() {
    let engine = engine();
    let stmt = engine
        .compile(Select::from("db", "users").filter(like("Name", "100%")))
        .unwrap();
    assert_eq!(stmt.sql(), "SELECT * FROM `db`.`users` WHERE `Name` LIKE ?");
    assert_eq!(stmt.args(), &[SqlValue::Text("100\\%".into())]);
}

#[test]
fn test_report_query() {
    let engine = engine();
    let query = Select::from("db", "users")
        .columns([json_unquote("Address", "city"), count_all()])
        .filter(or([
            and([equal("Active", true), greater_than("Score", 5.0f64)]),
            in_("Name", vec!["root", "admin"]),
        ]))
        .group_by([json_unquote("Address", "city")])
        .order_by([desc(count_all())])
        .limit(5);
    let stmt = engine.compile(query).unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT `Address` ->> '$.city', COUNT(*) FROM `db`.`users` \
         WHERE ((`Active` = ? AND `Score` > ?) OR `Name` IN (?, ?)) \
         GROUP BY `Address` ->> '$.city' ORDER BY COUNT(*) DESC LIMIT 5"
    );
    assert_eq!(
        stmt.args(),
        &[
            SqlValue::Bool(true),
            SqlValue::Float(5.0),
            SqlValue::Text("root".into()),
            SqlValue::Text("admin".into()),
        ]
    );
}

#[test]
fn test_update_and_delete() {
    let engine = engine();
    let stmt = engine
        .compile(
            Update::table("db", "users")
                .set("Name", "Grace")
                .filter(equal("Active", false)),
        )
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE `db`.`users` SET `Name` = ? WHERE `Active` = ?"
    );
    assert_eq!(stmt.args().len(), 2);

    let stmt = engine
        .compile(Delete::from("db", "users").filter(equal("Active", false)).limit(10))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "DELETE FROM `db`.`users` WHERE `Active` = ? LIMIT 10"
    );
}

#[test]
fn test_create_table_for_record() {
    let engine = engine();
    let create = engine
        .create_table::<Post>(Table::new("blog", "posts"))
        .unwrap();
    let stmt = engine.compile(create).unwrap();
    assert_eq!(
        stmt.sql(),
        "CREATE TABLE `blog`.`posts` (\
         `ID` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT, \
         `Title` VARCHAR(191) NOT NULL, \
         `PublishedAt` DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
         PRIMARY KEY (`ID`)) \
         ENGINE=INNODB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
    );
    assert!(stmt.args().is_empty());
}

#[test]
fn test_create_table_with_json_and_embedded_columns() {
    let engine = engine();
    let create = engine
        .create_table::<User>(Table::new("db", "users"))
        .unwrap();
    let stmt = engine.compile(create).unwrap();
    let sql = stmt.sql();
    assert!(sql.contains("`ID` BINARY(16) NOT NULL"), "{sql}");
    assert!(sql.contains("`Name` VARCHAR(64) NOT NULL"), "{sql}");
    assert!(sql.contains("`Active` TINYINT(1) NOT NULL"), "{sql}");
    assert!(sql.contains("`Address` JSON NOT NULL"), "{sql}");
    assert!(
        sql.contains("`City` VARCHAR(191) AS (`Address` ->> '$.city') VIRTUAL"),
        "{sql}"
    );
    assert!(sql.contains("`Tags` JSON NOT NULL"), "{sql}");
    assert!(sql.contains("`Nickname` VARCHAR(191) NULL"), "{sql}");
    assert!(sql.contains("`CreatedBy` VARCHAR(191) NOT NULL"), "{sql}");
    assert!(!sql.contains("scratch"), "{sql}");
    assert!(sql.contains("PRIMARY KEY (`ID`)"), "{sql}");
}

#[test]
fn test_alter_table_keeps_columns_unless_unsafe() {
    let live = || {
        LiveSchema::new(
            vec!["ID".into(), "Title".into(), "Body".into()],
            vec!["PRIMARY".into()],
        )
    };

    let engine = engine();
    let alter = engine
        .alter_table::<Post>(Table::new("blog", "posts"), live())
        .unwrap();
    let sql = engine.compile(alter).unwrap().sql().to_string();
    assert!(sql.starts_with("ALTER TABLE `blog`.`posts` MODIFY COLUMN `ID`"), "{sql}");
    assert!(sql.contains("ADD COLUMN `PublishedAt`"), "{sql}");
    assert!(!sql.contains("DROP COLUMN"), "{sql}");

    let config = sqlmap_core::EngineConfig {
        unsafe_migrations: true,
        ..Default::default()
    };
    let engine = sqlmap_core::Engine::new(config).unwrap();
    let alter = engine
        .alter_table::<Post>(Table::new("blog", "posts"), live())
        .unwrap();
    let sql = engine.compile(alter).unwrap().sql().to_string();
    assert!(sql.ends_with("DROP COLUMN `Body`"), "{sql}");
}

#[test]
fn test_insert_of_records() {
    let engine = engine();
    let posts = vec![
        Post {
            id: 1,
            title: "Hello".into(),
            ..Default::default()
        },
        Post {
            id: 2,
            title: "World".into(),
            ..Default::default()
        },
    ];
    let insert = engine
        .insert(Table::new("blog", "posts"), &posts, InsertMode::Ignore)
        .unwrap();
    let stmt = engine.compile(insert).unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT IGNORE INTO `blog`.`posts` (`ID`, `Title`, `PublishedAt`) \
         VALUES (?, ?, CURRENT_TIMESTAMP(6)),(?, ?, CURRENT_TIMESTAMP(6))"
    );
    assert_eq!(
        stmt.args(),
        &[
            SqlValue::Uint(1),
            SqlValue::Text("Hello".into()),
            SqlValue::Uint(2),
            SqlValue::Text("World".into()),
        ]
    );
}

#[test]
fn test_failed_compile_reports_and_recycles() {
    let engine = engine();
    let err = engine
        .compile(Insert::into_table("db", "t").columns(["A", "B"]))
        .unwrap_err();
    assert_eq!(
        err,
        Error::Compile(CompileError::Empty {
            part: "VALUES rows"
        })
    );
    assert_eq!(engine.pool().idle_count(), 1);
}
