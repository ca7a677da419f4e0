use super::*;
use crate::codec::CodecRegistry;
use crate::expr::*;
use crate::schema::{SchemaCache, TypeSchema};
use crate::stmt::CompiledStatement;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use sqlmap_types::{record, Kind, RawJson, Reflect, SqlArgument, SqlValue, Value, ValueError};
use std::sync::Arc;
use uuid::Uuid;

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Account {
        #[sql = "ID,primary_key"]
        pub id: i64,
        #[sql = "Name"]
        pub name: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Location {
        #[sql = "city,virtual_column=City"]
        pub city: String,
        #[sql = "lat,stored_column"]
        pub lat: f64,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Member {
        #[sql = "ID,primary_key,auto_increment"]
        pub id: u32,
        #[sql = "Email,size=120,unique_index,comment=login"]
        pub email: String,
        #[sql = "Role,enum=admin|user,default=user"]
        pub role: String,
        #[sql = "Location"]
        pub location: Location,
        #[sql = "JoinedAt"]
        pub joined_at: DateTime<Utc>,
        #[sql = "Nickname"]
        pub nickname: Option<String>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Document {
        #[sql = "ID,primary_key"]
        pub id: i64,
        #[sql = r#"Attrs,generated_column,default={"color":"red","size":{"w":2,"h":1.5},"ok":true}"#]
        pub attrs: RawJson,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Order {
        #[sql = "ID,primary_key"]
        pub id: Uuid,
        #[sql = "UserID,foreign_key=users:ID"]
        pub user_id: i64,
        #[sql = "Flags,set=gift|rush"]
        pub flags: Vec<String>,
        #[sql = "Receipt"]
        pub receipt: Vec<u8>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BadIncrement {
        #[sql = "Code,auto_increment"]
        pub code: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Stamped {
        #[sql = "ID,primary_key"]
        pub id: i64,
        #[sql = "CreatedAt,default=CURRENT_TIMESTAMP"]
        pub created_at: DateTime<Utc>,
        #[sql = "UpdatedAt,default=now"]
        pub updated_at: DateTime<Utc>,
        #[sql = "Label,default=NOW"]
        pub label: String,
        #[sql = "Enabled,default=false"]
        pub enabled: bool,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BadFlag {
        #[sql = "Active,default=maybe"]
        pub active: bool,
    }
}

/// Host type with no column mapping.
#[derive(Debug, Clone, Default, PartialEq)]
struct Opaque;

impl Reflect for Opaque {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Opaque>(Kind::Struct)
    }

    fn to_value(&self) -> Value {
        Value::Null
    }

    fn from_value(_value: Value) -> Result<Self, ValueError> {
        Ok(Opaque)
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct WithOpaque {
        #[sql = "Blob"]
        pub blob: Opaque,
    }
}

/// Dialect with numbered placeholders and double-quoted identifiers.
#[derive(Debug)]
struct NumberedDialect;

impl Dialect for NumberedDialect {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn quote(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    fn write_placeholder(&self, buf: &mut StatementBuffer, pos: usize) {
        buf.write_str(&format!("${pos}"));
    }

    fn supports(&self, expr: &Expr) -> bool {
        !matches!(expr, Expr::JsonPath { .. })
    }

    fn column_type(
        &self,
        _field: &FieldDescriptor,
        _config: &EngineConfig,
    ) -> Result<String, CompileError> {
        Ok("TEXT".to_string())
    }

    fn json_leaf_type(&self, _leaf: JsonLeaf, _config: &EngineConfig) -> String {
        "TEXT".to_string()
    }

    fn table_options(&self, _config: &EngineConfig) -> String {
        String::new()
    }
}

struct Fixture {
    codecs: CodecRegistry,
    schemas: SchemaCache,
    config: EngineConfig,
}

impl Fixture {
    fn new() -> Self {
        Self {
            codecs: CodecRegistry::with_defaults(),
            schemas: SchemaCache::new(8).unwrap(),
            config: EngineConfig::default(),
        }
    }

    fn compile_with(
        &self,
        dialect: &dyn Dialect,
        stmt: impl Into<Statement>,
    ) -> Result<CompiledStatement, CompileError> {
        let mut buf = StatementBuffer::new();
        Compiler::new(dialect, &self.codecs, &self.schemas, &self.config)
            .compile(&stmt.into(), &mut buf)?;
        Ok(buf.into_compiled())
    }

    fn compile(&self, stmt: impl Into<Statement>) -> Result<CompiledStatement, CompileError> {
        self.compile_with(&MySqlDialect, stmt)
    }

    fn sql(&self, stmt: impl Into<Statement>) -> String {
        self.compile(stmt).unwrap().sql
    }

    fn schema<T: Reflect>(&self) -> Arc<TypeSchema> {
        self.schemas.get_or_build::<T>().unwrap()
    }
}

#[test]
fn test_select_with_condition() {
    let f = Fixture::new();
    let stmt = f
        .compile(Select::from("db", "t").filter(equal("A", 1i32)))
        .unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM `db`.`t` WHERE `A` = ?");
    assert_eq!(stmt.args, vec![SqlValue::Int(1)]);
}

#[test]
fn test_select_clause_order() {
    let f = Fixture::new();
    let query = Select::from_table(Table::new("db", "users").alias("u"))
        .columns([col("u.ID"), alias(count_all(), "n")])
        .join(
            JoinKind::Left,
            Source::Table(Table::new("db", "orders").alias("o")),
            "u.ID",
            col("o.UserID"),
        )
        .filter(is_not_null("u.Email"))
        .group_by([col("u.ID")])
        .having(greater_than(count_all(), 1i64))
        .order_by([desc("n")])
        .limit(10)
        .offset(5)
        .lock(LockMode::ForUpdate);
    let stmt = f.compile(query).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT `u`.`ID`, COUNT(*) AS `n` FROM `db`.`users` AS `u` \
         LEFT JOIN `db`.`orders` AS `o` ON `u`.`ID` = `o`.`UserID` \
         WHERE `u`.`Email` IS NOT NULL GROUP BY `u`.`ID` HAVING COUNT(*) > ? \
         ORDER BY `n` DESC LIMIT 10 OFFSET 5 FOR UPDATE"
    );
    assert_eq!(stmt.args, vec![SqlValue::Int(1)]);
}

#[test]
fn test_offset_without_limit() {
    let f = Fixture::new();
    assert_eq!(
        f.sql(Select::from("", "t").offset(3)),
        format!("SELECT * FROM `t` LIMIT {} OFFSET 3", u64::MAX)
    );
}

#[test]
fn test_groups_and_empty_groups() {
    let f = Fixture::new();
    let stmt = f
        .compile(
            Select::from("db", "t")
                .filter(or([equal("a", 1i32), equal("b", 2i32)]))
                .filter(and(Vec::new()))
                .filter(not(and([equal("c", 3i32)]))),
        )
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM `db`.`t` WHERE (`a` = ? OR `b` = ?) AND NOT (`c` = ?)"
    );
    assert_eq!(stmt.args.len(), 3);

    let err = f.compile(Select::from("db", "t").filter(not(or(Vec::new()))));
    assert_eq!(
        err.unwrap_err(),
        CompileError::Empty {
            part: "condition group"
        }
    );
}

#[test]
fn test_like_escapes_argument_not_text() {
    let f = Fixture::new();
    let stmt = f
        .compile(Select::from("db", "t").filter(like("Name", "50%_off\\")))
        .unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM `db`.`t` WHERE `Name` LIKE ?");
    assert_eq!(stmt.args, vec![SqlValue::Text("50\\%\\_off\\\\".into())]);

    // Pre-encoded arguments keep their wildcards
    let stmt = f
        .compile(Select::from("db", "t").filter(not_like("Name", SqlArgument::bind("%x%"))))
        .unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM `db`.`t` WHERE `Name` NOT LIKE ?");
    assert_eq!(stmt.args, vec![SqlValue::Text("%x%".into())]);
}

#[test]
fn test_in_lists_and_subqueries() {
    let f = Fixture::new();
    let stmt = f
        .compile(Select::from("db", "t").filter(in_("ID", vec![1i64, 2, 3])))
        .unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM `db`.`t` WHERE `ID` IN (?, ?, ?)");
    assert_eq!(stmt.args.len(), 3);

    let sub = Select::from("db", "o").columns([col("UserID")]);
    assert_eq!(
        f.sql(Select::from("db", "t").filter(not_in("ID", [sub]))),
        "SELECT * FROM `db`.`t` WHERE `ID` NOT IN (SELECT `UserID` FROM `db`.`o`)"
    );

    assert_eq!(
        f.sql(Select::from("db", "t").filter(in_("ID", Vec::<i64>::new()))),
        "SELECT * FROM `db`.`t` WHERE 1 = 0"
    );
    assert_eq!(
        f.sql(Select::from("db", "t").filter(not_in("ID", Vec::<i64>::new()))),
        "SELECT * FROM `db`.`t` WHERE 1 = 1"
    );
}

#[test]
fn test_null_comparisons() {
    let f = Fixture::new();
    let stmt = f
        .compile(
            Select::from("db", "t")
                .filter(equal("DeletedAt", None::<i64>))
                .filter(not_equal("Owner", None::<String>)),
        )
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM `db`.`t` WHERE `DeletedAt` IS NULL AND `Owner` IS NOT NULL"
    );
    assert!(stmt.args.is_empty());
}

#[test]
fn test_condition_rejects_non_comparison_operator() {
    let f = Fixture::new();
    let bad = Expr::Condition {
        left: Box::new(col("a")),
        op: Operator::In,
        right: Box::new(lit(1i32)),
    };
    let err = f.compile(Select::from("db", "t").filter(bad)).unwrap_err();
    assert_eq!(
        err,
        CompileError::Unsupported {
            node: "IN",
            dialect: "mysql"
        }
    );

    let bad = Expr::Condition {
        left: Box::new(col("a")),
        op: Operator::IsNull,
        right: Box::new(lit(None::<i64>)),
    };
    let err = f.compile(Select::from("db", "t").filter(bad)).unwrap_err();
    assert!(matches!(err, CompileError::Unsupported { node: "IS NULL", .. }));
}

#[test]
fn test_expressions_in_projection() {
    let f = Fixture::new();
    let query = Select::new().columns([
        case()
            .when(equal("s", 1i32), "on")
            .otherwise("off")
            .end(),
        mul(add("a", 1i32), col("b")),
        json_unquote("Location", "city"),
        cast(col("x"), "CHAR"),
        count_distinct("y"),
        func("COALESCE", [col("z"), lit(0i32)]),
    ]);
    let stmt = f.compile(query).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT CASE WHEN `s` = ? THEN ? ELSE ? END, (`a` + ?) * `b`, \
         `Location` ->> '$.city', CAST(`x` AS CHAR), COUNT(DISTINCT `y`), COALESCE(`z`, ?)"
    );
    assert_eq!(
        stmt.args,
        vec![
            SqlValue::Int(1),
            SqlValue::Text("on".into()),
            SqlValue::Text("off".into()),
            SqlValue::Int(1),
            SqlValue::Int(0),
        ]
    );
}

#[test]
fn test_exists_and_wildcards() {
    let f = Fixture::new();
    let inner = Select::from("db", "o")
        .columns([raw("1", [])])
        .filter(equal("o.UserID", col("u.ID")));
    assert_eq!(
        f.sql(
            Select::from_table(Table::new("db", "users").alias("u"))
                .columns([Expr::Wildcard {
                    table: Some("u".into())
                }])
                .filter(not_exists(inner))
        ),
        "SELECT `u`.* FROM `db`.`users` AS `u` WHERE NOT EXISTS \
         (SELECT 1 FROM `db`.`o` WHERE `o`.`UserID` = `u`.`ID`)"
    );
}

#[test]
fn test_raw_expressions() {
    let f = Fixture::new();
    let stmt = f
        .compile(Select::from("db", "t").filter(raw("FIND_IN_SET(?, `Tags`) > ?", [
            lit("a".to_string()),
            lit(0i32),
        ])))
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM `db`.`t` WHERE FIND_IN_SET(?, `Tags`) > ?"
    );
    assert_eq!(stmt.args, vec![SqlValue::Text("a".into()), SqlValue::Int(0)]);

    let err = f
        .compile(Select::from("db", "t").filter(raw("? = ?", [lit(1i32)])))
        .unwrap_err();
    assert_eq!(err, CompileError::RawArgs { expected: 2, got: 1 });
}

#[test]
fn test_encoder_calls_are_inlined() {
    let f = Fixture::new();
    let stmt = f
        .compile(Delete::from("db", "orders").filter(equal("ID", Uuid::nil())))
        .unwrap();
    assert_eq!(stmt.sql, "DELETE FROM `db`.`orders` WHERE `ID` = UUID_TO_BIN(?)");
    assert_eq!(stmt.args.len(), 1);
}

#[test]
fn test_update_and_delete() {
    let f = Fixture::new();
    let stmt = f
        .compile(
            Update::table("db", "t")
                .set("Name", "x")
                .set("Count", add("Count", 1i32))
                .filter(equal("ID", 7i64))
                .limit(1),
        )
        .unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE `db`.`t` SET `Name` = ?, `Count` = `Count` + ? WHERE `ID` = ? LIMIT 1"
    );
    assert_eq!(
        stmt.args,
        vec![SqlValue::Text("x".into()), SqlValue::Int(1), SqlValue::Int(7)]
    );

    assert_eq!(
        f.compile(Update::table("db", "t")).unwrap_err(),
        CompileError::Empty { part: "SET clause" }
    );

    assert_eq!(
        f.sql(
            Delete::from("db", "t")
                .filter(between("Age", 18i32, 30i32))
                .order_by([asc("ID")])
                .limit(5)
        ),
        "DELETE FROM `db`.`t` WHERE `Age` BETWEEN ? AND ? ORDER BY `ID` ASC LIMIT 5"
    );
}

#[test]
fn test_insert_modes() {
    let f = Fixture::new();
    let base = Insert::into_table("db", "t")
        .columns(["ID", "Name"])
        .values([lit(1i64), lit("a".to_string())])
        .values([lit(2i64), lit("b".to_string())]);

    let stmt = f.compile(base.clone()).unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO `db`.`t` (`ID`, `Name`) VALUES (?, ?),(?, ?)"
    );
    assert_eq!(stmt.args.len(), 4);

    assert_eq!(
        f.sql(base.clone().mode(InsertMode::Ignore)),
        "INSERT IGNORE INTO `db`.`t` (`ID`, `Name`) VALUES (?, ?),(?, ?)"
    );
    assert_eq!(
        f.sql(base.clone().mode(InsertMode::Replace)),
        "REPLACE INTO `db`.`t` (`ID`, `Name`) VALUES (?, ?),(?, ?)"
    );
    assert_eq!(
        f.sql(base.clone().on_duplicate_update(["Name"])),
        "INSERT INTO `db`.`t` (`ID`, `Name`) VALUES (?, ?),(?, ?) \
         ON DUPLICATE KEY UPDATE `Name` = VALUES(`Name`)"
    );
    assert_eq!(
        f.sql(base.mode(InsertMode::Upsert)),
        "INSERT INTO `db`.`t` (`ID`, `Name`) VALUES (?, ?),(?, ?) \
         ON DUPLICATE KEY UPDATE `ID` = VALUES(`ID`), `Name` = VALUES(`Name`)"
    );
}

#[test]
fn test_insert_select_and_shape_errors() {
    let f = Fixture::new();
    let archive = Insert::into_table("db", "archive")
        .columns(["ID"])
        .select(Select::from("db", "t").columns([col("ID")]).filter(less_than("ID", 100i64)));
    assert_eq!(
        f.sql(archive),
        "INSERT INTO `db`.`archive` (`ID`) SELECT `ID` FROM `db`.`t` WHERE `ID` < ?"
    );

    let ragged = Insert::into_table("db", "t")
        .columns(["a", "b"])
        .values([lit(1i32)]);
    assert_eq!(
        f.compile(ragged).unwrap_err(),
        CompileError::ColumnCount {
            columns: 2,
            values: 1
        }
    );
    assert_eq!(
        f.compile(Insert::into_table("db", "t").columns(["a"]))
            .unwrap_err(),
        CompileError::Empty { part: "VALUES rows" }
    );
    assert_eq!(
        f.compile(Insert::into_table("db", "t").values([lit(1i32)]))
            .unwrap_err(),
        CompileError::Empty { part: "column list" }
    );
}

#[test]
fn test_numbered_dialect() {
    let f = Fixture::new();
    let stmt = f
        .compile_with(
            &NumberedDialect,
            Select::from("", "t").filter(equal("a", 1i32)).filter(in_("b", [2i32, 3])),
        )
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM \"t\" WHERE \"a\" = $1 AND \"b\" IN ($2, $3)"
    );
}

#[test]
fn test_unsupported_node_resets_buffer() {
    let f = Fixture::new();
    let mut buf = StatementBuffer::new();
    let stmt = Statement::from(
        Select::from("db", "t")
            .filter(equal("a", 1i32))
            .filter(equal(json_extract("Doc", "x"), 2i32)),
    );
    let err = Compiler::new(&NumberedDialect, &f.codecs, &f.schemas, &f.config)
        .compile(&stmt, &mut buf)
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::Unsupported {
            node: "JsonPath",
            dialect: "numbered"
        }
    );
    assert!(buf.is_empty());
    assert!(buf.args().is_empty());
}

#[test]
fn test_create_table_basic() {
    let f = Fixture::new();
    let create = CreateTable::new(Table::new("db", "accounts"), f.schema::<Account>());
    assert_eq!(
        f.sql(create),
        "CREATE TABLE `db`.`accounts` (`ID` BIGINT NOT NULL, `Name` VARCHAR(191) NOT NULL, \
         PRIMARY KEY (`ID`)) ENGINE=INNODB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
    );
}

#[test]
fn test_create_table_column_attributes() {
    let f = Fixture::new();
    let create = CreateTable::new(Table::new("db", "members"), f.schema::<Member>()).if_not_exists();
    assert_eq!(
        f.sql(create),
        "CREATE TABLE IF NOT EXISTS `db`.`members` (\
         `ID` INT UNSIGNED NOT NULL AUTO_INCREMENT, \
         `Email` VARCHAR(120) NOT NULL COMMENT 'login', \
         `Role` ENUM('admin','user') NOT NULL DEFAULT 'user', \
         `Location` JSON NOT NULL, \
         `City` VARCHAR(191) AS (`Location` ->> '$.city') VIRTUAL, \
         `lat` DOUBLE AS (`Location` ->> '$.lat') STORED, \
         `JoinedAt` DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
         `Nickname` VARCHAR(191) NULL, \
         PRIMARY KEY (`ID`), UNIQUE INDEX `UX_Email` (`Email`)) \
         ENGINE=INNODB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
    );
}

#[test]
fn test_create_table_special_types() {
    let f = Fixture::new();
    let sql = f.sql(CreateTable::new(Table::new("db", "orders"), f.schema::<Order>()));
    assert!(sql.contains("`ID` BINARY(16) NOT NULL"), "{sql}");
    assert!(sql.contains("`Flags` SET('gift','rush') NOT NULL"), "{sql}");
    assert!(sql.contains("`Receipt` LONGBLOB NOT NULL"), "{sql}");
    assert!(
        sql.contains(
            "CONSTRAINT `FK_orders_UserID` FOREIGN KEY (`UserID`) REFERENCES `db`.`users` (`ID`)"
        ),
        "{sql}"
    );
}

#[test]
fn test_create_table_keyword_and_bool_defaults() {
    let f = Fixture::new();
    let sql = f.sql(CreateTable::new(Table::new("db", "stamped"), f.schema::<Stamped>()));
    assert!(
        sql.contains("`CreatedAt` DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)"),
        "{sql}"
    );
    assert!(
        sql.contains("`UpdatedAt` DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)"),
        "{sql}"
    );
    assert!(sql.contains("`Label` VARCHAR(191) NOT NULL DEFAULT 'NOW'"), "{sql}");
    assert!(sql.contains("`Enabled` TINYINT(1) NOT NULL DEFAULT 0"), "{sql}");

    let err = f
        .compile(CreateTable::new(Table::new("db", "t"), f.schema::<BadFlag>()))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidOption { ref column, ref source }
            if column == "Active" && source.option == "default" && source.value == "maybe"
    ));
}

#[test]
fn test_flattened_generated_columns() {
    let f = Fixture::new();
    let sql = f.sql(CreateTable::new(Table::new("db", "docs"), f.schema::<Document>()));
    assert!(
        sql.contains(r#"`Attrs` JSON NOT NULL DEFAULT ('{"color":"red","size":{"w":2,"h":1.5},"ok":true}')"#),
        "{sql}"
    );
    assert!(sql.contains("`Attrs_color` VARCHAR(191) AS (`Attrs` ->> '$.color') VIRTUAL"), "{sql}");
    assert!(sql.contains("`Attrs_size_w` BIGINT AS (`Attrs` ->> '$.size.w') VIRTUAL"), "{sql}");
    assert!(sql.contains("`Attrs_size_h` DOUBLE AS (`Attrs` ->> '$.size.h') VIRTUAL"), "{sql}");
    assert!(sql.contains("`Attrs_ok` TINYINT(1) AS (`Attrs` ->> '$.ok') VIRTUAL"), "{sql}");
}

#[test]
fn test_create_table_errors() {
    let f = Fixture::new();
    let err = f
        .compile(CreateTable::new(Table::new("db", "t"), f.schema::<BadIncrement>()))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidOption { ref column, ref source }
            if column == "Code" && source.option == "auto_increment"
    ));

    let err = f
        .compile(CreateTable::new(Table::new("db", "t"), f.schema::<WithOpaque>()))
        .unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedType { ref column, .. } if column == "Blob"));
}

#[test]
fn test_alter_table_safe_mode() {
    let f = Fixture::new();
    let live = LiveSchema::new(
        vec!["ID".into(), "Legacy".into()],
        vec!["PRIMARY".into()],
    );
    let alter = AlterTable::new(Table::new("db", "accounts"), f.schema::<Account>(), live);
    let sql = f.sql(alter.clone());
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`accounts` MODIFY COLUMN `ID` BIGINT NOT NULL FIRST, \
         ADD COLUMN `Name` VARCHAR(191) NOT NULL AFTER `ID`, \
         DROP PRIMARY KEY, ADD PRIMARY KEY (`ID`)"
    );
    assert!(!sql.contains("DROP COLUMN"));

    let sql = f.sql(alter.unsafe_mode(true));
    assert!(sql.ends_with(", DROP COLUMN `Legacy`"), "{sql}");
}

#[test]
fn test_alter_table_adds_missing_indexes() {
    let f = Fixture::new();
    let live = LiveSchema::new(vec!["ID".into(), "Email".into()], Vec::new());
    let sql = f.sql(AlterTable::new(Table::new("db", "members"), f.schema::<Member>(), live));
    assert!(sql.contains("ADD PRIMARY KEY (`ID`)"), "{sql}");
    assert!(!sql.contains("DROP PRIMARY KEY"), "{sql}");
    assert!(sql.contains("ADD UNIQUE INDEX `UX_Email` (`Email`)"), "{sql}");
    assert!(sql.contains("ADD COLUMN `City` VARCHAR(191) AS (`Location` ->> '$.city') VIRTUAL AFTER `Location`"), "{sql}");

    let live = LiveSchema::new(vec!["ID".into()], vec!["PRIMARY".into(), "UX_Email".into()]);
    let sql = f.sql(AlterTable::new(Table::new("db", "members"), f.schema::<Member>(), live));
    assert!(!sql.contains("UNIQUE INDEX"), "{sql}");
}

#[test]
fn test_table_maintenance_statements() {
    let f = Fixture::new();
    let table = Table::new("db", "t");
    assert_eq!(f.sql(DropTable::new(table.clone())), "DROP TABLE IF EXISTS `db`.`t`");
    assert_eq!(
        f.sql(DropTable {
            table: table.clone(),
            if_exists: false
        }),
        "DROP TABLE `db`.`t`"
    );
    assert_eq!(
        f.sql(TruncateTable {
            table: table.clone()
        }),
        "TRUNCATE TABLE `db`.`t`"
    );
    assert_eq!(
        f.sql(RenameTable {
            from: table.clone(),
            to: Table::new("db", "t2")
        }),
        "RENAME TABLE `db`.`t` TO `db`.`t2`"
    );
    assert_eq!(
        f.sql(CreateIndex::new(table.clone(), "IX_a_b", ["a", "b"]).unique()),
        "CREATE UNIQUE INDEX `IX_a_b` ON `db`.`t` (`a`, `b`)"
    );
    assert_eq!(
        f.compile(CreateIndex::new(table.clone(), "IX", Vec::<String>::new()))
            .unwrap_err(),
        CompileError::Empty {
            part: "index columns"
        }
    );
    assert_eq!(
        f.sql(DropIndex {
            table,
            name: "IX_a_b".into()
        }),
        "DROP INDEX `IX_a_b` ON `db`.`t`"
    );
}

#[test]
fn test_catalog_queries() {
    let f = Fixture::new();
    let stmt = f
        .compile(HasTable {
            table: Table::new("db", "t"),
        })
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT 1 FROM information_schema.TABLES WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?"
    );
    assert_eq!(
        stmt.args,
        vec![SqlValue::Text("db".into()), SqlValue::Text("t".into())]
    );

    let stmt = f
        .compile(ColumnsOf {
            table: Table::new("", "t"),
        })
        .unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION"
    );
    assert_eq!(stmt.args.len(), 1);

    assert!(f
        .sql(IndexesOf {
            table: Table::new("db", "t")
        })
        .starts_with("SELECT DISTINCT INDEX_NAME FROM information_schema.STATISTICS"));
}

#[test]
fn test_identifier_quoting_and_escaping() {
    assert_eq!(MySqlDialect.quote("we`ird"), "`we``ird`");
    assert_eq!(escape_like("a%b_c\\d"), "a\\%b\\_c\\\\d");
    assert_eq!(
        MySqlDialect.table_name(&Table::new("", "t")),
        "`t`"
    );
}

#[test]
fn test_dialect_lookup() {
    assert_eq!(dialect_by_name("MySQL").unwrap().name(), "mysql");
    assert_eq!(
        dialect_by_name("oracle").unwrap_err(),
        ConfigError::UnknownDialect("oracle".into())
    );
}
