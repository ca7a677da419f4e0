//! Data statement shapes: SELECT, UPDATE, DELETE, INSERT and REPLACE.

use super::node::{Column, Expr, IntoExpr};

/// A table, optionally qualified by database and aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    /// Database name; empty when unqualified
    pub database: String,
    pub name: String,
    pub alias: Option<String>,
}

impl Table {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// What a SELECT reads from or a JOIN attaches.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(Table),
    Subquery { query: Box<Select>, alias: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// `<kind> <source> ON <left> = <right>`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub source: Source,
    pub on: Option<(Expr, Expr)>,
}

/// Row locking clause appended to a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    ForUpdate,
    ForShare,
}

impl LockMode {
    pub fn clause(self) -> &'static str {
        match self {
            LockMode::ForUpdate => "FOR UPDATE",
            LockMode::ForShare => "LOCK IN SHARE MODE",
        }
    }
}

/// SELECT statement.
///
/// An empty projection selects `*`. Filters are joined with `AND`; wrap them
/// in [`or`](super::or) for alternatives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projections: Vec<Expr>,
    pub from: Option<Source>,
    pub joins: Vec<Join>,
    pub filters: Vec<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Vec<Expr>,
    pub order_by: Vec<Expr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<LockMode>,
}

impl Select {
    /// A SELECT without a FROM clause, e.g. `SELECT 1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT * FROM database.table`
    pub fn from(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::from_table(Table::new(database, table))
    }

    pub fn from_table(table: Table) -> Self {
        Self {
            from: Some(Source::Table(table)),
            ..Self::default()
        }
    }

    /// `SELECT * FROM (query) AS alias`
    pub fn from_subquery(query: Select, alias: impl Into<String>) -> Self {
        Self {
            from: Some(Source::Subquery {
                query: Box::new(query),
                alias: alias.into(),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn columns(mut self, projections: impl IntoIterator<Item = Expr>) -> Self {
        self.projections.extend(projections);
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn filter(mut self, condition: Expr) -> Self {
        self.filters.push(condition);
        self
    }

    /// Adds a join on `left = right`.
    #[must_use]
    pub fn join(
        mut self,
        kind: JoinKind,
        source: Source,
        left: impl Into<Expr>,
        right: impl IntoExpr,
    ) -> Self {
        self.joins.push(Join {
            kind,
            source,
            on: Some((left.into(), right.into_expr())),
        });
        self
    }

    #[must_use]
    pub fn cross_join(mut self, source: Source) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            source,
            on: None,
        });
        self
    }

    #[must_use]
    pub fn group_by(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.group_by.extend(exprs);
        self
    }

    #[must_use]
    pub fn having(mut self, condition: Expr) -> Self {
        self.having.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.order_by.extend(sorts);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Table,
    pub set: Vec<(Column, Expr)>,
    pub filters: Vec<Expr>,
    pub order_by: Vec<Expr>,
    pub limit: Option<u64>,
}

impl Update {
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            table: Table::new(database, table),
            set: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<Column>, value: impl IntoExpr) -> Self {
        self.set.push((column.into(), value.into_expr()));
        self
    }

    #[must_use]
    pub fn filter(mut self, condition: Expr) -> Self {
        self.filters.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.order_by.extend(sorts);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: Table,
    pub filters: Vec<Expr>,
    pub order_by: Vec<Expr>,
    pub limit: Option<u64>,
}

impl Delete {
    pub fn from(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            table: Table::new(database, table),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, condition: Expr) -> Self {
        self.filters.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.order_by.extend(sorts);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// How rows that collide with an existing key are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InsertMode {
    /// Plain `INSERT INTO`
    #[default]
    Insert,
    /// `INSERT IGNORE INTO`
    Ignore,
    /// `REPLACE INTO`
    Replace,
    /// `INSERT INTO ... ON DUPLICATE KEY UPDATE`
    Upsert,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// One tuple per row, each matching the column list
    Values(Vec<Vec<Expr>>),
    Select(Box<Select>),
}

/// INSERT or REPLACE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: Table,
    pub mode: InsertMode,
    pub columns: Vec<String>,
    pub source: InsertSource,
    /// Columns refreshed on key collision in [`InsertMode::Upsert`]; empty
    /// means every inserted column
    pub update_columns: Vec<String>,
}

impl Insert {
    pub fn into_table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            table: Table::new(database, table),
            mode: InsertMode::Insert,
            columns: Vec::new(),
            source: InsertSource::Values(Vec::new()),
            update_columns: Vec::new(),
        }
    }

    pub fn replace_into(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::into_table(database, table).mode(InsertMode::Replace)
    }

    #[must_use]
    pub fn mode(mut self, mode: InsertMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Appends one row of values. Switches a SELECT source back to VALUES.
    #[must_use]
    pub fn values(mut self, row: impl IntoIterator<Item = Expr>) -> Self {
        let row: Vec<Expr> = row.into_iter().collect();
        match &mut self.source {
            InsertSource::Values(rows) => rows.push(row),
            InsertSource::Select(_) => self.source = InsertSource::Values(vec![row]),
        }
        self
    }

    /// `INSERT INTO ... SELECT ...`
    #[must_use]
    pub fn select(mut self, query: Select) -> Self {
        self.source = InsertSource::Select(Box::new(query));
        self
    }

    /// Switches to upsert mode refreshing `columns` on key collision.
    #[must_use]
    pub fn on_duplicate_update<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.mode = InsertMode::Upsert;
        self.update_columns.extend(columns.into_iter().map(Into::into));
        self
    }
}
