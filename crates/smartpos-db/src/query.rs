//! # Query Criteria
//!
//! A small typed predicate/ordering DSL that renders to SQLite through
//! `sqlx::QueryBuilder`.
//!
//! ## From Criteria to SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Criteria → SQL                                       │
//! │                                                                         │
//! │  Find::new()                                                           │
//! │      .filter(Filter::contains(CategoryColumn::CategoryName, "bev"))    │
//! │      .order_by_desc(CategoryColumn::Id)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT * FROM categories                                              │
//! │  WHERE is_delete = 0                 ← soft-delete guard (default)     │
//! │    AND (category_name LIKE ?1)       ← values always bound, never      │
//! │  ORDER BY id DESC                       formatted into the SQL text    │
//! │  LIMIT ?2 OFFSET ?3                  ← window added by paging          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column names come from a per-table enum implementing [`Column`], so a
//! filter can only reference columns that exist on that table.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use smartpos_core::EntityStatus;
use sqlx::{QueryBuilder, Sqlite};

use crate::table::SqlEntity;

// =============================================================================
// Column
// =============================================================================

/// A column of one table.
pub trait Column: Copy + fmt::Debug + Send + Sync + 'static {
    /// The SQL column name.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Value
// =============================================================================

/// A value bound into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Appends this value as a bind parameter.
    pub(crate) fn push_bind(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Null => {
                qb.push_bind(None::<i64>);
            }
            Value::Bool(v) => {
                qb.push_bind(*v);
            }
            Value::Int(v) => {
                qb.push_bind(*v);
            }
            Value::Real(v) => {
                qb.push_bind(*v);
            }
            Value::Text(v) => {
                qb.push_bind(v.clone());
            }
            Value::Timestamp(v) => {
                qb.push_bind(*v);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<EntityStatus> for Value {
    fn from(v: EntityStatus) -> Self {
        Value::Text(v.as_str().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    /// `LIKE` over an escaped pattern; `\` escapes `%`, `_` and itself.
    Contains,
}

impl CompareOp {
    fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::Ne => " <> ",
            CompareOp::Gt => " > ",
            CompareOp::Ge => " >= ",
            CompareOp::Lt => " < ",
            CompareOp::Le => " <= ",
            CompareOp::Like | CompareOp::Contains => " LIKE ",
        }
    }
}

/// A boolean predicate over the columns `C` of one table.
///
/// ## Example
/// ```rust,ignore
/// let filter = Filter::eq(ProductColumn::CategoryId, 3)
///     .and(Filter::ge(ProductColumn::PriceCents, 100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<C> {
    Compare { column: C, op: CompareOp, value: Value },
    IsNull(C),
    IsNotNull(C),
    In(C, Vec<Value>),
    And(Vec<Filter<C>>),
    Or(Vec<Filter<C>>),
    Not(Box<Filter<C>>),
}

impl<C: Column> Filter<C> {
    fn compare(column: C, op: CompareOp, value: impl Into<Value>) -> Self {
        Filter::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// `column = value` (`IS NULL` when the value is null).
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column <> value` (`IS NOT NULL` when value is null).
    pub fn ne(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    pub fn gt(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn ge(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    pub fn lt(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn le(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    /// SQL `LIKE` with a caller-supplied pattern.
    pub fn like(column: C, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Like, Value::Text(pattern.into()))
    }

    /// Substring match (`LIKE %term%`, case-insensitive for ASCII in SQLite).
    /// `%` and `_` in `term` match literally.
    pub fn contains(column: C, term: &str) -> Self {
        Self::compare(
            column,
            CompareOp::Contains,
            Value::Text(format!("%{}%", escape_like(term))),
        )
    }

    pub fn is_null(column: C) -> Self {
        Filter::IsNull(column)
    }

    pub fn is_not_null(column: C) -> Self {
        Filter::IsNotNull(column)
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn in_list<V: Into<Value>>(column: C, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column, values.into_iter().map(Into::into).collect())
    }

    /// Both predicates must hold.
    pub fn and(self, other: Filter<C>) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Either predicate holds.
    pub fn or(self, other: Filter<C>) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Renders this predicate, binding every value.
    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            // `= NULL` never matches in SQL; callers mean IS NULL.
            Filter::Compare { column, op, value }
                if value.is_null() && matches!(op, CompareOp::Eq | CompareOp::Ne) =>
            {
                qb.push(column.name());
                if *op == CompareOp::Eq {
                    qb.push(" IS NULL");
                } else {
                    qb.push(" IS NOT NULL");
                }
            }
            Filter::Compare { column, op, value } => {
                qb.push(column.name());
                qb.push(op.sql());
                value.push_bind(qb);
                if *op == CompareOp::Contains {
                    qb.push(" ESCAPE '\\'");
                }
            }
            Filter::IsNull(column) => {
                qb.push(column.name());
                qb.push(" IS NULL");
            }
            Filter::IsNotNull(column) => {
                qb.push(column.name());
                qb.push(" IS NOT NULL");
            }
            Filter::In(_, values) if values.is_empty() => {
                qb.push("0");
            }
            Filter::In(column, values) => {
                qb.push(column.name());
                qb.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    value.push_bind(qb);
                }
                qb.push(")");
            }
            Filter::And(parts) => push_group(qb, parts, " AND ", "1"),
            Filter::Or(parts) => push_group(qb, parts, " OR ", "0"),
            Filter::Not(inner) => {
                qb.push("NOT (");
                inner.push_sql(qb);
                qb.push(")");
            }
        }
    }
}

/// Escapes the `LIKE` wildcards in `term` with `\\`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_group<C: Column>(
    qb: &mut QueryBuilder<'_, Sqlite>,
    parts: &[Filter<C>],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        qb.push("(");
        part.push_sql(qb);
        qb.push(")");
    }
    qb.push(")");
}

// =============================================================================
// Ordering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        }
    }

    fn reversed(&self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order<C> {
    pub column: C,
    pub direction: Direction,
}

impl<C: Column> Order<C> {
    pub fn asc(column: C) -> Self {
        Order {
            column,
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: C) -> Self {
        Order {
            column,
            direction: Direction::Desc,
        }
    }

    /// The same key sorted the other way.
    pub fn reversed(&self) -> Self {
        Order {
            column: self.column,
            direction: self.direction.reversed(),
        }
    }
}

pub(crate) fn push_order_by<C: Column>(qb: &mut QueryBuilder<'_, Sqlite>, orders: &[Order<C>]) {
    if orders.is_empty() {
        return;
    }

    qb.push(" ORDER BY ");
    for (i, order) in orders.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(order.column.name());
        qb.push(order.direction.sql());
    }
}

// =============================================================================
// Selector
// =============================================================================

/// A server-side projection: the columns to select, decoded into `R`.
///
/// `R` must implement `sqlx::FromRow` with field names matching the
/// selected columns.
///
/// ## Example
/// ```rust,ignore
/// #[derive(sqlx::FromRow)]
/// struct CategoryOption { id: i64, category_name: String }
///
/// let selector = Selector::<_, CategoryOption>::new([
///     CategoryColumn::Id,
///     CategoryColumn::CategoryName,
/// ]);
/// ```
pub struct Selector<C, R> {
    columns: Vec<C>,
    _row: PhantomData<fn() -> R>,
}

impl<C: Column, R> Selector<C, R> {
    pub fn new(columns: impl IntoIterator<Item = C>) -> Self {
        Selector {
            columns: columns.into_iter().collect(),
            _row: PhantomData,
        }
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub(crate) fn push_columns(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.columns.is_empty() {
            qb.push("*");
            return;
        }

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column.name());
        }
    }
}

impl<C: Clone, R> Clone for Selector<C, R> {
    fn clone(&self) -> Self {
        Selector {
            columns: self.columns.clone(),
            _row: PhantomData,
        }
    }
}

impl<C: fmt::Debug, R> fmt::Debug for Selector<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("columns", &self.columns)
            .finish()
    }
}

// =============================================================================
// Find
// =============================================================================

/// Filter, ordering and inclusion directives for one entity type.
///
/// Replaces the overload families of a classic generic repository:
/// every combination of predicate / order / includes is one `Find`.
///
/// ## Example
/// ```rust,ignore
/// let find = Find::<Category>::new()
///     .filter(Filter::contains(CategoryColumn::CategoryName, "drink"))
///     .order_by(CategoryColumn::CategoryName)
///     .include(CategoryInclude::Products);
/// ```
pub struct Find<E: SqlEntity> {
    pub(crate) filter: Option<Filter<E::Column>>,
    pub(crate) orders: Vec<Order<E::Column>>,
    pub(crate) includes: Vec<E::Include>,
}

impl<E: SqlEntity> Find<E> {
    /// Matches every live row, unordered.
    pub fn new() -> Self {
        Find {
            filter: None,
            orders: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Starts from a predicate.
    pub fn filtered(filter: Filter<E::Column>) -> Self {
        Find::new().filter(filter)
    }

    /// Adds a predicate; repeated calls are combined with AND.
    pub fn filter(mut self, filter: Filter<E::Column>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Appends an ascending sort key.
    pub fn order_by(mut self, column: E::Column) -> Self {
        self.orders.push(Order::asc(column));
        self
    }

    /// Appends a descending sort key.
    pub fn order_by_desc(mut self, column: E::Column) -> Self {
        self.orders.push(Order::desc(column));
        self
    }

    /// Appends a sort key.
    pub fn then_by(mut self, order: Order<E::Column>) -> Self {
        self.orders.push(order);
        self
    }

    /// Requests related data to be loaded alongside each row.
    pub fn include(mut self, include: E::Include) -> Self {
        self.includes.push(include);
        self
    }

    pub fn has_order(&self) -> bool {
        !self.orders.is_empty()
    }

    /// Orders by id descending (most recent first) unless an order is set.
    pub(crate) fn or_newest_first(mut self) -> Self {
        if self.orders.is_empty() {
            self.orders.push(Order::desc(E::ID_COLUMN));
        }
        self
    }
}

impl<E: SqlEntity> Default for Find<E> {
    fn default() -> Self {
        Find::new()
    }
}

impl<E: SqlEntity> Clone for Find<E> {
    fn clone(&self) -> Self {
        Find {
            filter: self.filter.clone(),
            orders: self.orders.clone(),
            includes: self.includes.clone(),
        }
    }
}

impl<E: SqlEntity> fmt::Debug for Find<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Find")
            .field("filter", &self.filter)
            .field("orders", &self.orders)
            .field("includes", &self.includes)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
