//! # Query Sources
//!
//! The store-side half of paging: anything that can count its rows and
//! fetch a window of them.
//!
//! ## Lazily Evaluated Queries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     EntityQuery Lifecycle                               │
//! │                                                                         │
//! │  db.query::<Category>()            ← nothing executed yet              │
//! │      .filter(..)                                                        │
//! │      .order_by_desc(..)                                                 │
//! │      .include(..)                                                       │
//! │       │                                                                 │
//! │       ├── count()        → SELECT COUNT(*) ...         (1 round-trip)  │
//! │       ├── fetch(window)  → SELECT * ... LIMIT/OFFSET   (1 round-trip)  │
//! │       │                    + 1 round-trip per include                   │
//! │       ├── exists()       → SELECT EXISTS(...)                           │
//! │       └── select(sel)    → ProjectedQuery (only selected columns)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Soft-deleted rows are excluded unless [`EntityQuery::with_deleted`] is
//! called.

use std::fmt;
use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::trace;

use crate::error::DbResult;
use crate::query::{push_order_by, Column, Filter, Find, Order, Selector};
use crate::table::SqlEntity;

// =============================================================================
// Window
// =============================================================================

/// Rows to skip and the maximum number to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub skip: u64,
    /// `None` takes every remaining row.
    pub take: Option<u64>,
}

impl Window {
    /// Every row.
    pub fn all() -> Self {
        Window::default()
    }

    /// `take` rows after skipping `skip`.
    pub fn new(skip: u64, take: u64) -> Self {
        Window {
            skip,
            take: Some(take),
        }
    }

    /// The first `take` rows.
    pub fn first(take: u64) -> Self {
        Window::new(0, take)
    }

    /// Appends `LIMIT`/`OFFSET` for this window.
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match (self.take, self.skip) {
            (None, 0) => {}
            (take, skip) => {
                // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
                qb.push(" LIMIT ");
                qb.push_bind(take.map_or(-1, clamp_i64));
                if skip > 0 {
                    qb.push(" OFFSET ");
                    qb.push_bind(clamp_i64(skip));
                }
            }
        }
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// Source Traits
// =============================================================================

/// A countable, windowable sequence of rows.
///
/// Ordering and filtering are the source's business; paging only counts
/// and slices.
pub trait QuerySource: Send + Sync {
    type Item: Send;

    /// Number of rows, ignoring any window.
    fn count(&self) -> impl Future<Output = DbResult<u64>> + Send;

    /// Materializes the rows inside `window`, in source order.
    fn fetch(&self, window: Window) -> impl Future<Output = DbResult<Vec<Self::Item>>> + Send;
}

/// A source that can apply a projection `P` before materializing.
pub trait Project<P>: QuerySource + Sized {
    type Output: QuerySource;

    fn project(self, projection: P) -> Self::Output;
}

// -----------------------------------------------------------------------------
// In-memory rows
// -----------------------------------------------------------------------------

impl<T: Clone + Send + Sync> QuerySource for Vec<T> {
    type Item = T;

    async fn count(&self) -> DbResult<u64> {
        Ok(self.len() as u64)
    }

    async fn fetch(&self, window: Window) -> DbResult<Vec<T>> {
        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let take = window
            .take
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));

        Ok(self.iter().skip(skip).take(take).cloned().collect())
    }
}

impl<T, U, F> Project<F> for Vec<T>
where
    T: Clone + Send + Sync,
    U: Clone + Send + Sync,
    F: FnMut(T) -> U,
{
    type Output = Vec<U>;

    fn project(self, projection: F) -> Vec<U> {
        self.into_iter().map(projection).collect()
    }
}

// =============================================================================
// EntityQuery
// =============================================================================

/// A composable query over one entity table.
pub struct EntityQuery<E: SqlEntity> {
    pool: SqlitePool,
    find: Find<E>,
    with_deleted: bool,
}

impl<E: SqlEntity> EntityQuery<E> {
    /// All live rows of the table, unordered.
    pub fn new(pool: SqlitePool) -> Self {
        EntityQuery::from_find(pool, Find::new())
    }

    /// A query from prepared criteria.
    pub fn from_find(pool: SqlitePool, find: Find<E>) -> Self {
        EntityQuery {
            pool,
            find,
            with_deleted: false,
        }
    }

    /// Adds a predicate (AND-ed with earlier ones).
    pub fn filter(mut self, filter: Filter<E::Column>) -> Self {
        self.find = self.find.filter(filter);
        self
    }

    pub fn order_by(mut self, column: E::Column) -> Self {
        self.find = self.find.order_by(column);
        self
    }

    pub fn order_by_desc(mut self, column: E::Column) -> Self {
        self.find = self.find.order_by_desc(column);
        self
    }

    pub fn include(mut self, include: E::Include) -> Self {
        self.find = self.find.include(include);
        self
    }

    /// Also returns soft-deleted rows.
    pub fn with_deleted(mut self) -> Self {
        self.with_deleted = true;
        self
    }

    /// Switches to a server-side projection.
    pub fn select<R>(self, selector: Selector<E::Column, R>) -> ProjectedQuery<E, R>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        ProjectedQuery {
            base: self,
            selector,
        }
    }

    /// Every matching row, in query order.
    pub async fn fetch_all(&self) -> DbResult<Vec<E>> {
        self.fetch(Window::all()).await
    }

    /// The first matching row under the query order.
    pub async fn first(&self) -> DbResult<Option<E>> {
        Ok(self.fetch(Window::first(1)).await?.into_iter().next())
    }

    /// The last matching row under the query order (id ascending when the
    /// query is unordered).
    pub async fn last(&self) -> DbResult<Option<E>> {
        let orders: Vec<Order<E::Column>> = if self.find.orders.is_empty() {
            vec![Order::asc(E::ID_COLUMN)]
        } else {
            self.find.orders.clone()
        };

        let reversed = EntityQuery {
            pool: self.pool.clone(),
            find: Find {
                filter: self.find.filter.clone(),
                orders: orders.iter().map(Order::reversed).collect(),
                includes: self.find.includes.clone(),
            },
            with_deleted: self.with_deleted,
        };

        reversed.first().await
    }

    /// Whether any row matches.
    pub async fn exists(&self) -> DbResult<bool> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(E::TABLE);
        self.push_where(&mut qb);
        qb.push(")");

        trace!(sql = %qb.sql(), "exists");
        let found: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(found != 0)
    }

    /// Appends the WHERE clause: soft-delete guard plus the caller filter.
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let guard = !self.with_deleted;

        match (&self.find.filter, guard) {
            (None, false) => {}
            (None, true) => {
                qb.push(" WHERE ");
                qb.push(E::IS_DELETE_COLUMN.name());
                qb.push(" = 0");
            }
            (Some(filter), false) => {
                qb.push(" WHERE (");
                filter.push_sql(qb);
                qb.push(")");
            }
            (Some(filter), true) => {
                qb.push(" WHERE ");
                qb.push(E::IS_DELETE_COLUMN.name());
                qb.push(" = 0 AND (");
                filter.push_sql(qb);
                qb.push(")");
            }
        }
    }

    /// `SELECT <columns> FROM table WHERE .. ORDER BY .. LIMIT ..`
    fn select_sql<R>(&self, selector: Option<&Selector<E::Column, R>>, window: Window) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        match selector {
            Some(selector) => selector.push_columns(&mut qb),
            None => {
                qb.push("*");
            }
        }
        qb.push(" FROM ");
        qb.push(E::TABLE);
        self.push_where(&mut qb);
        push_order_by(&mut qb, &self.find.orders);
        window.push_sql(&mut qb);
        qb
    }
}

impl<E: SqlEntity> QuerySource for EntityQuery<E> {
    type Item = E;

    async fn count(&self) -> DbResult<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        qb.push(E::TABLE);
        self.push_where(&mut qb);

        trace!(sql = %qb.sql(), "count");
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch(&self, window: Window) -> DbResult<Vec<E>> {
        let mut qb = self.select_sql::<E>(None, window);

        trace!(sql = %qb.sql(), "fetch");
        let mut rows: Vec<E> = qb.build_query_as().fetch_all(&self.pool).await?;

        if !rows.is_empty() && !self.find.includes.is_empty() {
            E::load_includes(&self.pool, &mut rows, &self.find.includes).await?;
        }

        Ok(rows)
    }
}

impl<E, R> Project<Selector<E::Column, R>> for EntityQuery<E>
where
    E: SqlEntity,
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    type Output = ProjectedQuery<E, R>;

    fn project(self, selector: Selector<E::Column, R>) -> ProjectedQuery<E, R> {
        self.select(selector)
    }
}

impl<E: SqlEntity> fmt::Debug for EntityQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("table", &E::TABLE)
            .field("find", &self.find)
            .field("with_deleted", &self.with_deleted)
            .finish()
    }
}

// =============================================================================
// ProjectedQuery
// =============================================================================

/// An [`EntityQuery`] that selects only some columns and decodes them as `R`.
///
/// Inclusion directives do not apply to projections.
pub struct ProjectedQuery<E: SqlEntity, R> {
    base: EntityQuery<E>,
    selector: Selector<E::Column, R>,
}

impl<E, R> ProjectedQuery<E, R>
where
    E: SqlEntity,
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub async fn fetch_all(&self) -> DbResult<Vec<R>> {
        self.fetch(Window::all()).await
    }
}

impl<E, R> QuerySource for ProjectedQuery<E, R>
where
    E: SqlEntity,
    R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    type Item = R;

    async fn count(&self) -> DbResult<u64> {
        self.base.count().await
    }

    async fn fetch(&self, window: Window) -> DbResult<Vec<R>> {
        let mut qb = self.base.select_sql(Some(&self.selector), window);

        trace!(sql = %qb.sql(), "fetch projection");
        let rows: Vec<R> = qb.build_query_as().fetch_all(&self.base.pool).await?;
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
