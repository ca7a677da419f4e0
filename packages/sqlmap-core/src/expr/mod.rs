//! Dialect-neutral expression and statement algebra.
//!
//! Nodes carry no compilation logic. The [`Compiler`](crate::dialect::Compiler)
//! interprets them for a concrete [`Dialect`](crate::dialect::Dialect).

mod ddl;
mod node;
mod statement;

pub use ddl::{
    AlterTable, ColumnsOf, CreateIndex, CreateTable, DropIndex, DropTable, HasTable, IndexesOf,
    LiveSchema, RenameTable, TruncateTable,
};
pub use node::{
    add, alias, and, asc, avg, between, case, cast, col, count, count_all, count_distinct, desc,
    div, equal, exists, func, greater_or_equal, greater_than, in_, is_not_null, is_null,
    json_extract, json_unquote, less_or_equal, less_than, like, lit, max, min, mul, not,
    not_between, not_equal, not_exists, not_in, not_like, or, raw, sub, sum, wildcard,
    AggregateFunc, CaseBuilder, Column, Expr, IntoExpr, Literal, Logic, MathOp, Operator, Order,
};
pub use statement::{
    Delete, Insert, InsertMode, InsertSource, Join, JoinKind, LockMode, Select, Source, Table,
    Update,
};

/// Any statement the compiler accepts.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(Select),
    Update(Update),
    Delete(Delete),
    Insert(Insert),
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    DropTable(DropTable),
    TruncateTable(TruncateTable),
    RenameTable(RenameTable),
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    HasTable(HasTable),
    ColumnsOf(ColumnsOf),
    IndexesOf(IndexesOf),
}

impl Statement {
    /// Statement shape name, for logging and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select(_) => "Select",
            Statement::Update(_) => "Update",
            Statement::Delete(_) => "Delete",
            Statement::Insert(i) => match i.mode {
                InsertMode::Replace => "Replace",
                _ => "Insert",
            },
            Statement::CreateTable(_) => "CreateTable",
            Statement::AlterTable(_) => "AlterTable",
            Statement::DropTable(_) => "DropTable",
            Statement::TruncateTable(_) => "TruncateTable",
            Statement::RenameTable(_) => "RenameTable",
            Statement::CreateIndex(_) => "CreateIndex",
            Statement::DropIndex(_) => "DropIndex",
            Statement::HasTable(_) => "HasTable",
            Statement::ColumnsOf(_) => "ColumnsOf",
            Statement::IndexesOf(_) => "IndexesOf",
        }
    }
}

macro_rules! statement_from {
    ($($variant:ident),* $(,)?) => {$(
        impl From<$variant> for Statement {
            fn from(s: $variant) -> Self {
                Statement::$variant(s)
            }
        }
    )*};
}

statement_from!(
    Select,
    Update,
    Delete,
    Insert,
    CreateTable,
    AlterTable,
    DropTable,
    TruncateTable,
    RenameTable,
    CreateIndex,
    DropIndex,
    HasTable,
    ColumnsOf,
    IndexesOf,
);

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
