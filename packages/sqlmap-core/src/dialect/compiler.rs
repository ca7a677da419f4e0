//! Statement and expression compilation.

use sqlmap_types::{SqlArgument, SqlValue, Value};
use tracing::debug;

use super::Dialect;
use crate::codec::{CodecContext, CodecRegistry};
use crate::config::EngineConfig;
use crate::error::CompileError;
use crate::expr::{
    Column, Delete, Expr, Insert, InsertMode, InsertSource, Literal, Operator, Select, Source,
    Statement, Update,
};
use crate::schema::{SchemaCache, EMPTY_OPTIONS};
use crate::stmt::StatementBuffer;

/// Writes statements as SQL text of one dialect.
///
/// Literals are encoded through the codec registry and appended to the
/// buffer's argument list in the order their placeholders appear.
#[derive(Clone, Copy)]
pub struct Compiler<'a> {
    pub(super) dialect: &'a dyn Dialect,
    pub(super) codecs: &'a CodecRegistry,
    pub(super) schemas: &'a SchemaCache,
    pub(super) config: &'a EngineConfig,
}

impl<'a> Compiler<'a> {
    pub fn new(
        dialect: &'a dyn Dialect,
        codecs: &'a CodecRegistry,
        schemas: &'a SchemaCache,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            dialect,
            codecs,
            schemas,
            config,
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Compiles a statement into `buf`.
    ///
    /// # Arguments
    /// * `stmt` - Statement to compile
    /// * `buf` - Buffer receiving SQL text and arguments
    ///
    /// # Returns
    /// `Ok(())` on success. On error the buffer is reset, so no partial SQL
    /// is left behind.
    pub fn compile(&self, stmt: &Statement, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        buf.start_timer();
        let result = self.write_statement(stmt, buf);
        let elapsed = buf.stop_timer();
        match &result {
            Ok(()) => debug!(
                "Compiled {} with {} args in {:?}: {}",
                stmt.name(),
                buf.pos(),
                elapsed.unwrap_or_default(),
                buf.sql()
            ),
            Err(e) => {
                debug!("Compiling {} failed: {}", stmt.name(), e);
                buf.reset();
            }
        }
        result
    }

    fn write_statement(&self, stmt: &Statement, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        match stmt {
            Statement::Select(s) => self.write_select(s, buf),
            Statement::Update(s) => self.write_update(s, buf),
            Statement::Delete(s) => self.write_delete(s, buf),
            Statement::Insert(s) => self.write_insert(s, buf),
            Statement::CreateTable(s) => self.write_create_table(s, buf),
            Statement::AlterTable(s) => self.write_alter_table(s, buf),
            Statement::DropTable(s) => {
                self.write_drop_table(s, buf);
                Ok(())
            }
            Statement::TruncateTable(s) => {
                buf.write_str("TRUNCATE TABLE ");
                buf.write_str(&self.dialect.table_name(&s.table));
                Ok(())
            }
            Statement::RenameTable(s) => {
                buf.write_str("RENAME TABLE ");
                buf.write_str(&self.dialect.table_name(&s.from));
                buf.write_str(" TO ");
                buf.write_str(&self.dialect.table_name(&s.to));
                Ok(())
            }
            Statement::CreateIndex(s) => self.write_create_index(s, buf),
            Statement::DropIndex(s) => {
                buf.write_str("DROP INDEX ");
                buf.write_str(&self.dialect.quote(&s.name));
                buf.write_str(" ON ");
                buf.write_str(&self.dialect.table_name(&s.table));
                Ok(())
            }
            Statement::HasTable(s) => {
                self.write_catalog_query("SELECT 1 FROM information_schema.TABLES", &s.table, "", buf);
                Ok(())
            }
            Statement::ColumnsOf(s) => {
                self.write_catalog_query(
                    "SELECT COLUMN_NAME FROM information_schema.COLUMNS",
                    &s.table,
                    " ORDER BY ORDINAL_POSITION",
                    buf,
                );
                Ok(())
            }
            Statement::IndexesOf(s) => {
                self.write_catalog_query(
                    "SELECT DISTINCT INDEX_NAME FROM information_schema.STATISTICS",
                    &s.table,
                    "",
                    buf,
                );
                Ok(())
            }
        }
    }

    fn write_select(&self, select: &Select, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        buf.write_str("SELECT ");
        if select.distinct {
            buf.write_str("DISTINCT ");
        }
        if select.projections.is_empty() {
            buf.write_byte(b'*');
        } else {
            self.write_list(&select.projections, buf)?;
        }

        if let Some(from) = &select.from {
            buf.write_str(" FROM ");
            self.write_source(from, buf)?;
        }
        for join in &select.joins {
            buf.write_byte(b' ');
            buf.write_str(join.kind.keyword());
            buf.write_byte(b' ');
            self.write_source(&join.source, buf)?;
            if let Some((left, right)) = &join.on {
                buf.write_str(" ON ");
                self.compile_expr(left, buf)?;
                buf.write_str(" = ");
                self.compile_expr(right, buf)?;
            }
        }

        self.write_conditions(" WHERE ", &select.filters, buf)?;
        if !select.group_by.is_empty() {
            buf.write_str(" GROUP BY ");
            self.write_list(&select.group_by, buf)?;
        }
        self.write_conditions(" HAVING ", &select.having, buf)?;
        self.write_order_by(&select.order_by, buf)?;

        match (select.limit, select.offset) {
            (Some(limit), Some(offset)) => {
                buf.write_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => buf.write_str(&format!(" LIMIT {limit}")),
            // OFFSET needs a LIMIT; this is the largest row count MySQL accepts
            (None, Some(offset)) => {
                buf.write_str(&format!(" LIMIT {} OFFSET {offset}", u64::MAX));
            }
            (None, None) => {}
        }

        if let Some(lock) = select.lock {
            buf.write_byte(b' ');
            buf.write_str(lock.clause());
        }
        Ok(())
    }

    fn write_update(&self, update: &Update, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        if update.set.is_empty() {
            return Err(CompileError::Empty { part: "SET clause" });
        }
        buf.write_str("UPDATE ");
        buf.write_str(&self.dialect.table_name(&update.table));
        buf.write_str(" SET ");
        for (i, (column, value)) in update.set.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_str(&self.column_sql(column));
            buf.write_str(" = ");
            self.compile_expr(value, buf)?;
        }
        self.write_conditions(" WHERE ", &update.filters, buf)?;
        self.write_order_by(&update.order_by, buf)?;
        if let Some(limit) = update.limit {
            buf.write_str(&format!(" LIMIT {limit}"));
        }
        Ok(())
    }

    fn write_delete(&self, delete: &Delete, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        buf.write_str("DELETE FROM ");
        buf.write_str(&self.dialect.table_name(&delete.table));
        self.write_conditions(" WHERE ", &delete.filters, buf)?;
        self.write_order_by(&delete.order_by, buf)?;
        if let Some(limit) = delete.limit {
            buf.write_str(&format!(" LIMIT {limit}"));
        }
        Ok(())
    }

    fn write_insert(&self, insert: &Insert, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        if insert.columns.is_empty() {
            return Err(CompileError::Empty { part: "column list" });
        }
        buf.write_str(match insert.mode {
            InsertMode::Insert | InsertMode::Upsert => "INSERT INTO ",
            InsertMode::Ignore => "INSERT IGNORE INTO ",
            InsertMode::Replace => "REPLACE INTO ",
        });
        buf.write_str(&self.dialect.table_name(&insert.table));
        buf.write_str(" (");
        self.write_identifiers(&insert.columns, buf);
        buf.write_byte(b')');

        match &insert.source {
            InsertSource::Values(rows) => {
                if rows.is_empty() {
                    return Err(CompileError::Empty { part: "VALUES rows" });
                }
                buf.write_str(" VALUES ");
                for (i, row) in rows.iter().enumerate() {
                    if row.len() != insert.columns.len() {
                        return Err(CompileError::ColumnCount {
                            columns: insert.columns.len(),
                            values: row.len(),
                        });
                    }
                    if i > 0 {
                        buf.write_byte(b',');
                    }
                    buf.write_byte(b'(');
                    self.write_list(row, buf)?;
                    buf.write_byte(b')');
                }
            }
            InsertSource::Select(query) => {
                buf.write_byte(b' ');
                self.write_select(query, buf)?;
            }
        }

        if insert.mode == InsertMode::Upsert {
            let refreshed = if insert.update_columns.is_empty() {
                &insert.columns
            } else {
                &insert.update_columns
            };
            buf.write_str(" ON DUPLICATE KEY UPDATE ");
            for (i, column) in refreshed.iter().enumerate() {
                if i > 0 {
                    buf.write_str(", ");
                }
                let quoted = self.dialect.quote(column);
                buf.write_str(&format!("{quoted} = VALUES({quoted})"));
            }
        }
        Ok(())
    }

    /// `<query> WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?<suffix>`
    fn write_catalog_query(
        &self,
        query: &str,
        table: &crate::expr::Table,
        suffix: &str,
        buf: &mut StatementBuffer,
    ) {
        buf.write_str(query);
        buf.write_str(" WHERE TABLE_SCHEMA = ");
        if table.database.is_empty() {
            buf.write_str("DATABASE()");
        } else {
            self.write_argument(&SqlArgument::bind(table.database.as_str()), buf);
        }
        buf.write_str(" AND TABLE_NAME = ");
        self.write_argument(&SqlArgument::bind(table.name.as_str()), buf);
        buf.write_str(suffix);
    }

    /// Compiles one expression into `buf`.
    pub fn compile_expr(&self, expr: &Expr, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        if !self.dialect.supports(expr) {
            return Err(CompileError::Unsupported {
                node: expr.name(),
                dialect: self.dialect.name(),
            });
        }

        match expr {
            Expr::Raw { sql, args } => self.write_raw(sql, args, buf)?,
            Expr::Column(column) => buf.write_str(&self.column_sql(column)),
            Expr::Literal(literal) => self.write_literal(literal, buf)?,
            Expr::Arg(arg) => self.write_argument(arg, buf),
            Expr::Condition { left, op, right } => {
                // Range, pattern, list and null tests have their own nodes.
                if !op.is_comparison() {
                    return Err(CompileError::Unsupported {
                        node: op.token(),
                        dialect: self.dialect.name(),
                    });
                }
                self.compile_expr(left, buf)?;
                match (op, is_null_operand(right)) {
                    (Operator::Equal, true) => {
                        buf.write_byte(b' ');
                        buf.write_str(self.dialect.operator_token(Operator::IsNull));
                    }
                    (Operator::NotEqual, true) => {
                        buf.write_byte(b' ');
                        buf.write_str(self.dialect.operator_token(Operator::IsNotNull));
                    }
                    _ => {
                        buf.write_byte(b' ');
                        buf.write_str(self.dialect.operator_token(*op));
                        buf.write_byte(b' ');
                        self.compile_expr(right, buf)?;
                    }
                }
            }
            Expr::Range {
                expr,
                negate,
                from,
                to,
            } => {
                self.compile_expr(expr, buf)?;
                let op = if *negate {
                    Operator::NotBetween
                } else {
                    Operator::Between
                };
                buf.write_byte(b' ');
                buf.write_str(self.dialect.operator_token(op));
                buf.write_byte(b' ');
                self.compile_expr(from, buf)?;
                buf.write_str(" AND ");
                self.compile_expr(to, buf)?;
            }
            Expr::Nil { expr, negate } => {
                self.compile_expr(expr, buf)?;
                let op = if *negate {
                    Operator::IsNotNull
                } else {
                    Operator::IsNull
                };
                buf.write_byte(b' ');
                buf.write_str(self.dialect.operator_token(op));
            }
            Expr::Like {
                expr,
                negate,
                pattern,
            } => {
                self.compile_expr(expr, buf)?;
                let op = if *negate {
                    Operator::NotLike
                } else {
                    Operator::Like
                };
                buf.write_byte(b' ');
                buf.write_str(self.dialect.operator_token(op));
                buf.write_byte(b' ');
                match pattern.as_ref() {
                    Expr::Literal(Literal {
                        value: Value::String(s),
                        ty,
                    }) => self.write_literal(
                        &Literal {
                            value: Value::String(escape_like(s)),
                            ty: ty.clone(),
                        },
                        buf,
                    )?,
                    other => self.compile_expr(other, buf)?,
                }
            }
            Expr::In { expr, negate, set } => self.write_in(expr, *negate, set, buf)?,
            Expr::Group { logic, items } => {
                let items: Vec<&Expr> = items.iter().filter(|e| !is_empty_group(e)).collect();
                match items.as_slice() {
                    [] => return Err(CompileError::Empty { part: "condition group" }),
                    [single] => self.compile_expr(single, buf)?,
                    _ => {
                        buf.write_byte(b'(');
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                buf.write_byte(b' ');
                                buf.write_str(logic.keyword());
                                buf.write_byte(b' ');
                            }
                            self.compile_expr(item, buf)?;
                        }
                        buf.write_byte(b')');
                    }
                }
            }
            Expr::Not(inner) => {
                buf.write_str("NOT (");
                self.compile_expr(inner, buf)?;
                buf.write_byte(b')');
            }
            Expr::Sort { expr, order } => {
                self.compile_expr(expr, buf)?;
                buf.write_byte(b' ');
                buf.write_str(order.keyword());
            }
            Expr::Func { name, args } => {
                buf.write_str(name);
                buf.write_byte(b'(');
                self.write_list(args, buf)?;
                buf.write_byte(b')');
            }
            Expr::JsonPath {
                column,
                path,
                unquote,
            } => {
                let column = self.column_sql(column);
                buf.write_str(&self.dialect.json_path(&column, path, *unquote));
            }
            Expr::Aggregate {
                func,
                expr,
                distinct,
            } => {
                buf.write_str(func.name());
                buf.write_byte(b'(');
                if *distinct {
                    buf.write_str("DISTINCT ");
                }
                match expr {
                    Some(inner) => self.compile_expr(inner, buf)?,
                    None => buf.write_byte(b'*'),
                }
                buf.write_byte(b')');
            }
            Expr::Case {
                branches,
                otherwise,
            } => {
                if branches.is_empty() {
                    return Err(CompileError::Empty { part: "CASE branches" });
                }
                buf.write_str("CASE");
                for (condition, result) in branches {
                    buf.write_str(" WHEN ");
                    self.compile_expr(condition, buf)?;
                    buf.write_str(" THEN ");
                    self.compile_expr(result, buf)?;
                }
                if let Some(otherwise) = otherwise {
                    buf.write_str(" ELSE ");
                    self.compile_expr(otherwise, buf)?;
                }
                buf.write_str(" END");
            }
            Expr::Math { left, op, right } => {
                self.write_operand(left, buf)?;
                buf.write_byte(b' ');
                buf.write_str(op.symbol());
                buf.write_byte(b' ');
                self.write_operand(right, buf)?;
            }
            Expr::As { expr, alias } => {
                self.compile_expr(expr, buf)?;
                buf.write_str(" AS ");
                buf.write_str(&self.dialect.quote(alias));
            }
            Expr::Cast { expr, ty } => {
                buf.write_str("CAST(");
                self.compile_expr(expr, buf)?;
                buf.write_str(" AS ");
                buf.write_str(ty);
                buf.write_byte(b')');
            }
            Expr::Subquery(query) => {
                buf.write_byte(b'(');
                self.write_select(query, buf)?;
                buf.write_byte(b')');
            }
            Expr::Exists { negate, query } => {
                if *negate {
                    buf.write_str("NOT ");
                }
                buf.write_str("EXISTS (");
                self.write_select(query, buf)?;
                buf.write_byte(b')');
            }
            Expr::Tuple(items) => {
                buf.write_byte(b'(');
                self.write_list(items, buf)?;
                buf.write_byte(b')');
            }
            Expr::Wildcard { table } => match table {
                Some(table) => {
                    buf.write_str(&self.dialect.quote(table));
                    buf.write_str(".*");
                }
                None => buf.write_byte(b'*'),
            },
        }
        Ok(())
    }

    fn write_in(
        &self,
        expr: &Expr,
        negate: bool,
        set: &[Expr],
        buf: &mut StatementBuffer,
    ) -> Result<(), CompileError> {
        // An empty set matches nothing; its negation matches everything
        if set.is_empty() {
            buf.write_str(if negate { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        self.compile_expr(expr, buf)?;
        let op = if negate { Operator::NotIn } else { Operator::In };
        buf.write_byte(b' ');
        buf.write_str(self.dialect.operator_token(op));
        buf.write_byte(b' ');
        if let [query @ Expr::Subquery(_)] = set {
            return self.compile_expr(query, buf);
        }
        buf.write_byte(b'(');
        self.write_list(set, buf)?;
        buf.write_byte(b')');
        Ok(())
    }

    fn write_raw(&self, sql: &str, args: &[Expr], buf: &mut StatementBuffer) -> Result<(), CompileError> {
        let expected = sql.matches('?').count();
        if expected != args.len() {
            return Err(CompileError::RawArgs {
                expected,
                got: args.len(),
            });
        }
        let mut args = args.iter();
        for (i, part) in sql.split('?').enumerate() {
            if i > 0 {
                if let Some(arg) = args.next() {
                    self.compile_expr(arg, buf)?;
                }
            }
            buf.write_str(part);
        }
        Ok(())
    }

    fn write_literal(&self, literal: &Literal, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        let ctx = CodecContext::new(self.codecs, self.schemas, &literal.ty, &EMPTY_OPTIONS);
        let arg = ctx.encode(&literal.value)?;
        self.write_argument(&arg, buf);
        Ok(())
    }

    /// Binds values through placeholders and inlines raw SQL.
    pub(super) fn write_argument(&self, arg: &SqlArgument, buf: &mut StatementBuffer) {
        match arg {
            SqlArgument::Value(value) => {
                buf.push_arg(value.clone());
                let pos = buf.pos();
                self.dialect.write_placeholder(buf, pos);
            }
            SqlArgument::Raw(sql) => buf.write_str(sql),
            SqlArgument::Call { func, args } => {
                buf.write_str(func);
                buf.write_byte(b'(');
                for (i, inner) in args.iter().enumerate() {
                    if i > 0 {
                        buf.write_str(", ");
                    }
                    self.write_argument(inner, buf);
                }
                buf.write_byte(b')');
            }
        }
    }

    /// Arithmetic operand, parenthesized when it is itself arithmetic.
    fn write_operand(&self, expr: &Expr, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        if matches!(expr, Expr::Math { .. }) {
            buf.write_byte(b'(');
            self.compile_expr(expr, buf)?;
            buf.write_byte(b')');
            Ok(())
        } else {
            self.compile_expr(expr, buf)
        }
    }

    fn write_source(&self, source: &Source, buf: &mut StatementBuffer) -> Result<(), CompileError> {
        match source {
            Source::Table(table) => {
                buf.write_str(&self.dialect.table_name(table));
                if let Some(alias) = &table.alias {
                    buf.write_str(" AS ");
                    buf.write_str(&self.dialect.quote(alias));
                }
            }
            Source::Subquery { query, alias } => {
                buf.write_byte(b'(');
                self.write_select(query, buf)?;
                buf.write_str(") AS ");
                buf.write_str(&self.dialect.quote(alias));
            }
        }
        Ok(())
    }

    /// Writes non-empty conditions joined by `AND` after `keyword`.
    fn write_conditions(
        &self,
        keyword: &str,
        conditions: &[Expr],
        buf: &mut StatementBuffer,
    ) -> Result<(), CompileError> {
        let mut first = true;
        for condition in conditions.iter().filter(|c| !is_empty_group(c)) {
            buf.write_str(if first { keyword } else { " AND " });
            first = false;
            self.compile_expr(condition, buf)?;
        }
        Ok(())
    }

    fn write_order_by(&self, sorts: &[Expr], buf: &mut StatementBuffer) -> Result<(), CompileError> {
        if !sorts.is_empty() {
            buf.write_str(" ORDER BY ");
            self.write_list(sorts, buf)?;
        }
        Ok(())
    }

    fn write_list(&self, items: &[Expr], buf: &mut StatementBuffer) -> Result<(), CompileError> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            self.compile_expr(item, buf)?;
        }
        Ok(())
    }

    pub(super) fn write_identifiers(&self, names: &[String], buf: &mut StatementBuffer) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                buf.write_str(", ");
            }
            buf.write_str(&self.dialect.quote(name));
        }
    }

    fn column_sql(&self, column: &Column) -> String {
        match &column.table {
            Some(table) => format!("{}.{}", self.dialect.quote(table), self.dialect.quote(&column.name)),
            None => self.dialect.quote(&column.name),
        }
    }
}

/// Escapes `\`, `%` and `_` so a LIKE pattern matches them literally.
pub fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_null_operand(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(literal) => literal.value.is_null(),
        Expr::Arg(SqlArgument::Value(SqlValue::Null)) => true,
        _ => false,
    }
}

/// Whether a condition is an `AND`/`OR` group with nothing to test.
fn is_empty_group(expr: &Expr) -> bool {
    matches!(expr, Expr::Group { items, .. } if items.iter().all(is_empty_group))
}
