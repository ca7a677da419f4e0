//! Expression nodes and their constructors.

use chrono::{DateTime, Utc};
use sqlmap_types::{LineString, Point, RawJson, Reflect, SqlArgument, TypeInfo, Value};
use uuid::Uuid;

use super::statement::Select;

/// A possibly table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Column qualified by a table name or alias.
    pub fn of(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// `"name"` is an unqualified column, `"t.name"` a qualified one.
impl From<&str> for Column {
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((table, name)) => Column::of(table, name),
            None => Column::new(s),
        }
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Column::from(s.as_str())
    }
}

/// A host value together with the type it is encoded as.
#[derive(Debug, Clone)]
pub struct Literal {
    pub value: Value,
    pub ty: TypeInfo,
}

impl Literal {
    pub fn of<T: Reflect>(v: &T) -> Self {
        Self {
            value: v.to_value(),
            ty: T::type_info(),
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.value == other.value
    }
}

/// Binary and unary condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// SQL token of the operator.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns `true` for the binary comparisons a `Condition` node may carry.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterThan
                | Operator::GreaterOrEqual
                | Operator::LessThan
                | Operator::LessOrEqual
        )
    }
}

/// Connective of a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn keyword(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl MathOp {
    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

/// Expression node.
///
/// The set of variants is closed; dialects decide through
/// [`Dialect::supports`](crate::dialect::Dialect::supports) which ones they
/// can express.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// SQL text written as is; each `?` is replaced by the next argument
    Raw { sql: String, args: Vec<Expr> },
    Column(Column),
    /// Host value encoded through the codec registry
    Literal(Literal),
    /// Pre-encoded argument
    Arg(SqlArgument),
    /// `left <op> right` for comparison operators
    Condition {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    /// `expr [NOT] BETWEEN from AND to`
    Range {
        expr: Box<Expr>,
        negate: bool,
        from: Box<Expr>,
        to: Box<Expr>,
    },
    /// `expr IS [NOT] NULL`
    Nil { expr: Box<Expr>, negate: bool },
    /// `expr [NOT] LIKE pattern`; string literal patterns are escaped
    Like {
        expr: Box<Expr>,
        negate: bool,
        pattern: Box<Expr>,
    },
    /// `expr [NOT] IN (set)`; a single subquery element is inlined
    In {
        expr: Box<Expr>,
        negate: bool,
        set: Vec<Expr>,
    },
    /// Parenthesized conditions joined by one connective
    Group { logic: Logic, items: Vec<Expr> },
    Not(Box<Expr>),
    Sort { expr: Box<Expr>, order: Order },
    Func { name: String, args: Vec<Expr> },
    /// `column->'$.path'`, or `column->>'$.path'` when unquoted
    JsonPath {
        column: Column,
        path: String,
        unquote: bool,
    },
    /// Aggregate over an expression; `None` means `*`
    Aggregate {
        func: AggregateFunc,
        expr: Option<Box<Expr>>,
        distinct: bool,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },
    Math {
        left: Box<Expr>,
        op: MathOp,
        right: Box<Expr>,
    },
    As { expr: Box<Expr>, alias: String },
    Cast { expr: Box<Expr>, ty: String },
    Subquery(Box<Select>),
    Exists { negate: bool, query: Box<Select> },
    Tuple(Vec<Expr>),
    /// `*`, or `table.*`
    Wildcard { table: Option<String> },
}

impl Expr {
    /// Variant name, used in compile errors.
    pub fn name(&self) -> &'static str {
        match self {
            Expr::Raw { .. } => "Raw",
            Expr::Column(_) => "Column",
            Expr::Literal(_) => "Literal",
            Expr::Arg(_) => "Arg",
            Expr::Condition { .. } => "Condition",
            Expr::Range { .. } => "Range",
            Expr::Nil { .. } => "Nil",
            Expr::Like { .. } => "Like",
            Expr::In { .. } => "In",
            Expr::Group { .. } => "Group",
            Expr::Not(_) => "Not",
            Expr::Sort { .. } => "Sort",
            Expr::Func { .. } => "Func",
            Expr::JsonPath { .. } => "JsonPath",
            Expr::Aggregate { .. } => "Aggregate",
            Expr::Case { .. } => "Case",
            Expr::Math { .. } => "Math",
            Expr::As { .. } => "As",
            Expr::Cast { .. } => "Cast",
            Expr::Subquery(_) => "Subquery",
            Expr::Exists { .. } => "Exists",
            Expr::Tuple(_) => "Tuple",
            Expr::Wildcard { .. } => "Wildcard",
        }
    }
}

/// Column names convert into column references.
impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Column(Column::from(s))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Column(Column::from(s))
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

impl From<Select> for Expr {
    fn from(s: Select) -> Self {
        Expr::Subquery(Box::new(s))
    }
}

/// Right-hand operands: host values become literals, expressions stay as they are.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Column {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for Select {
    fn into_expr(self) -> Expr {
        Expr::Subquery(Box::new(self))
    }
}

impl IntoExpr for SqlArgument {
    fn into_expr(self) -> Expr {
        Expr::Arg(self)
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        Expr::Literal(Literal::of(&self.to_string()))
    }
}

impl<T: Reflect> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Literal(Literal::of(&self))
    }
}

impl<T: Reflect> IntoExpr for Vec<T> {
    fn into_expr(self) -> Expr {
        Expr::Literal(Literal::of(&self))
    }
}

macro_rules! literal_operand {
    ($($ty:ty),* $(,)?) => {$(
        impl IntoExpr for $ty {
            fn into_expr(self) -> Expr {
                Expr::Literal(Literal::of(&self))
            }
        }
    )*};
}

literal_operand!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    DateTime<Utc>,
    Uuid,
    RawJson,
    Point,
    LineString,
);

/// Column reference.
pub fn col(name: impl Into<Column>) -> Expr {
    Expr::Column(name.into())
}

/// Literal of any reflected type, including records stored as JSON.
pub fn lit<T: Reflect>(v: T) -> Expr {
    Expr::Literal(Literal::of(&v))
}

/// Inline SQL; `?` marks are replaced by `args` in order.
pub fn raw(sql: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Raw {
        sql: sql.into(),
        args: args.into_iter().collect(),
    }
}

pub fn wildcard() -> Expr {
    Expr::Wildcard { table: None }
}

fn condition(left: impl Into<Expr>, op: Operator, right: impl IntoExpr) -> Expr {
    Expr::Condition {
        left: Box::new(left.into()),
        op,
        right: Box::new(right.into_expr()),
    }
}

pub fn equal(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::Equal, value)
}

pub fn not_equal(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::NotEqual, value)
}

pub fn greater_than(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::GreaterThan, value)
}

pub fn greater_or_equal(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::GreaterOrEqual, value)
}

pub fn less_than(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::LessThan, value)
}

pub fn less_or_equal(field: impl Into<Expr>, value: impl IntoExpr) -> Expr {
    condition(field, Operator::LessOrEqual, value)
}

fn membership<I>(field: impl Into<Expr>, negate: bool, values: I) -> Expr
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    Expr::In {
        expr: Box::new(field.into()),
        negate,
        set: values.into_iter().map(IntoExpr::into_expr).collect(),
    }
}

/// `field IN (values)`. Pass a single [`Select`] for a subquery.
pub fn in_<I>(field: impl Into<Expr>, values: I) -> Expr
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    membership(field, false, values)
}

pub fn not_in<I>(field: impl Into<Expr>, values: I) -> Expr
where
    I: IntoIterator,
    I::Item: IntoExpr,
{
    membership(field, true, values)
}

pub fn between(field: impl Into<Expr>, from: impl IntoExpr, to: impl IntoExpr) -> Expr {
    Expr::Range {
        expr: Box::new(field.into()),
        negate: false,
        from: Box::new(from.into_expr()),
        to: Box::new(to.into_expr()),
    }
}

pub fn not_between(field: impl Into<Expr>, from: impl IntoExpr, to: impl IntoExpr) -> Expr {
    Expr::Range {
        expr: Box::new(field.into()),
        negate: true,
        from: Box::new(from.into_expr()),
        to: Box::new(to.into_expr()),
    }
}

/// `field LIKE pattern`. `%`, `_` and `\` inside a string literal pattern
/// match literally.
pub fn like(field: impl Into<Expr>, pattern: impl IntoExpr) -> Expr {
    Expr::Like {
        expr: Box::new(field.into()),
        negate: false,
        pattern: Box::new(pattern.into_expr()),
    }
}

pub fn not_like(field: impl Into<Expr>, pattern: impl IntoExpr) -> Expr {
    Expr::Like {
        expr: Box::new(field.into()),
        negate: true,
        pattern: Box::new(pattern.into_expr()),
    }
}

pub fn is_null(field: impl Into<Expr>) -> Expr {
    Expr::Nil {
        expr: Box::new(field.into()),
        negate: false,
    }
}

pub fn is_not_null(field: impl Into<Expr>) -> Expr {
    Expr::Nil {
        expr: Box::new(field.into()),
        negate: true,
    }
}

pub fn and(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Group {
        logic: Logic::And,
        items: items.into_iter().collect(),
    }
}

pub fn or(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Group {
        logic: Logic::Or,
        items: items.into_iter().collect(),
    }
}

pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

pub fn asc(field: impl Into<Expr>) -> Expr {
    Expr::Sort {
        expr: Box::new(field.into()),
        order: Order::Asc,
    }
}

pub fn desc(field: impl Into<Expr>) -> Expr {
    Expr::Sort {
        expr: Box::new(field.into()),
        order: Order::Desc,
    }
}

fn aggregate(func: AggregateFunc, field: impl Into<Expr>, distinct: bool) -> Expr {
    Expr::Aggregate {
        func,
        expr: Some(Box::new(field.into())),
        distinct,
    }
}

/// `COUNT(*)`
pub fn count_all() -> Expr {
    Expr::Aggregate {
        func: AggregateFunc::Count,
        expr: None,
        distinct: false,
    }
}

pub fn count(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Count, field, false)
}

pub fn count_distinct(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Count, field, true)
}

pub fn sum(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Sum, field, false)
}

pub fn avg(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Avg, field, false)
}

pub fn min(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Min, field, false)
}

pub fn max(field: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunc::Max, field, false)
}

/// SQL function call.
pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Func {
        name: name.into(),
        args: args.into_iter().collect(),
    }
}

/// `column->'$.path'`
pub fn json_extract(column: impl Into<Column>, path: impl Into<String>) -> Expr {
    Expr::JsonPath {
        column: column.into(),
        path: path.into(),
        unquote: false,
    }
}

/// `column->>'$.path'`
pub fn json_unquote(column: impl Into<Column>, path: impl Into<String>) -> Expr {
    Expr::JsonPath {
        column: column.into(),
        path: path.into(),
        unquote: true,
    }
}

fn math(left: impl Into<Expr>, op: MathOp, right: impl IntoExpr) -> Expr {
    Expr::Math {
        left: Box::new(left.into()),
        op,
        right: Box::new(right.into_expr()),
    }
}

pub fn add(left: impl Into<Expr>, right: impl IntoExpr) -> Expr {
    math(left, MathOp::Add, right)
}

pub fn sub(left: impl Into<Expr>, right: impl IntoExpr) -> Expr {
    math(left, MathOp::Sub, right)
}

pub fn mul(left: impl Into<Expr>, right: impl IntoExpr) -> Expr {
    math(left, MathOp::Mul, right)
}

pub fn div(left: impl Into<Expr>, right: impl IntoExpr) -> Expr {
    math(left, MathOp::Div, right)
}

pub fn alias(expr: impl Into<Expr>, name: impl Into<String>) -> Expr {
    Expr::As {
        expr: Box::new(expr.into()),
        alias: name.into(),
    }
}

/// `CAST(expr AS ty)`
pub fn cast(expr: impl Into<Expr>, ty: impl Into<String>) -> Expr {
    Expr::Cast {
        expr: Box::new(expr.into()),
        ty: ty.into(),
    }
}

pub fn exists(query: Select) -> Expr {
    Expr::Exists {
        negate: false,
        query: Box::new(query),
    }
}

pub fn not_exists(query: Select) -> Expr {
    Expr::Exists {
        negate: true,
        query: Box::new(query),
    }
}

/// Starts a `CASE WHEN ... END` expression.
pub fn case() -> CaseBuilder {
    CaseBuilder::default()
}

#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    branches: Vec<(Expr, Expr)>,
    otherwise: Option<Box<Expr>>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expr, then: impl IntoExpr) -> Self {
        self.branches.push((condition, then.into_expr()));
        self
    }

    pub fn otherwise(mut self, value: impl IntoExpr) -> Self {
        self.otherwise = Some(Box::new(value.into_expr()));
        self
    }

    pub fn end(self) -> Expr {
        Expr::Case {
            branches: self.branches,
            otherwise: self.otherwise,
        }
    }
}
