//! # Base Repository
//!
//! One generic repository shared by every entity table.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BaseRepository<E, M>                                 │
//! │                                                                         │
//! │  READS (soft-deleted rows always excluded)                             │
//! │  ├── get_page / get_page_as        → EntityQuery → paginate            │
//! │  ├── get_dropdown / get_dropdown_as → EntityQuery → limited_list       │
//! │  ├── first_or_default / _by_id      → LIMIT 1                          │
//! │  ├── last_or_default                → reversed order, LIMIT 1          │
//! │  ├── get_all                        → no window                        │
//! │  ├── get_as_no_tracking             → plain read                       │
//! │  └── any                            → SELECT EXISTS(...)               │
//! │                                                                         │
//! │  WRITES (one transaction each)                                         │
//! │  ├── insert / insert_range  → INSERT ... RETURNING *                   │
//! │  ├── update                 → load live → copy_fields → UPDATE         │
//! │  ├── update_range           → UPDATE each (full overwrite)             │
//! │  ├── delete                 → load live → is_delete = 1 → UPDATE       │
//! │  └── delete_range           → DELETE each (physical)                   │
//! │                                                                         │
//! │  Entities go in, view models (M: From<E>) come out.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Missing Records
//! Lookups return `Ok(None)`. `update`, `delete` and the range writes
//! return [`DbError::NotFound`] when a row has no live record.

use std::fmt;
use std::marker::PhantomData;

use smartpos_core::{CopyFields, Dropdown, EntityVm, Paging, Validate};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, trace};

use crate::error::{DbError, DbResult};
use crate::paging::{DropdownExt, PagingExt};
use crate::query::{Column, Filter, Find, Selector};
use crate::source::EntityQuery;
use crate::table::SqlEntity;

/// Generic CRUD and query repository for entity `E`, returning view model `M`.
///
/// ## Usage
/// ```rust,ignore
/// let categories = db.repository::<Category, CategoryVm>();
///
/// let page = categories.get_page(0, 10, Find::new()).await?;
/// let saved = categories.insert(Category::new("Drinks", "Cold drinks")).await?;
/// let removed = categories.delete(saved.id).await?;
/// ```
pub struct BaseRepository<E, M> {
    pool: SqlitePool,
    _types: PhantomData<fn() -> (E, M)>,
}

impl<E, M> Clone for BaseRepository<E, M> {
    fn clone(&self) -> Self {
        BaseRepository {
            pool: self.pool.clone(),
            _types: PhantomData,
        }
    }
}

impl<E: SqlEntity, M> fmt::Debug for BaseRepository<E, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRepository")
            .field("table", &E::TABLE)
            .finish()
    }
}

impl<E, M> BaseRepository<E, M>
where
    E: SqlEntity + CopyFields<E> + Validate,
    M: EntityVm<Id = E::Id> + From<E>,
{
    /// Creates a repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        BaseRepository {
            pool,
            _types: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A composable query over live rows of `E`.
    pub fn query(&self) -> EntityQuery<E> {
        EntityQuery::new(self.pool.clone())
    }

    fn find(&self, find: Find<E>) -> EntityQuery<E> {
        EntityQuery::from_find(self.pool.clone(), find)
    }

    fn by_id(&self, id: &E::Id) -> EntityQuery<E> {
        self.query().filter(Filter::eq(E::ID_COLUMN, E::id_value(id)))
    }

    // =========================================================================
    // Paging & Dropdown
    // =========================================================================

    /// One page of view models, most recent first unless `find` is ordered.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // 23 live rows → 3 rows, current_page 3, has_next_page false
    /// let page = repo.get_page(2, 10, Find::new()).await?;
    /// ```
    pub async fn get_page(&self, page_index: u32, page_size: u32, find: Find<E>) -> DbResult<Paging<M>> {
        debug!(entity = E::NAME, page_index, page_size, "Getting page");

        let page = self.find(find.or_newest_first()).paginate(page_index, page_size).await?;
        Ok(page.map_into())
    }

    /// One page of a server-side projection. Skips view-model mapping.
    pub async fn get_page_as<R>(
        &self,
        page_index: u32,
        page_size: u32,
        find: Find<E>,
        selector: Selector<E::Column, R>,
    ) -> DbResult<Paging<R>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(entity = E::NAME, page_index, page_size, "Getting projected page");

        self.find(find.or_newest_first())
            .paginate_as(selector, page_index, page_size)
            .await
    }

    /// At most `size` view models matching `filter`, most recent first.
    pub async fn get_dropdown(&self, filter: Option<Filter<E::Column>>, size: u32) -> DbResult<Dropdown<M>> {
        debug!(entity = E::NAME, size, "Getting dropdown");

        let find = match filter {
            Some(filter) => Find::filtered(filter),
            None => Find::new(),
        };
        let dropdown = self.find(find.or_newest_first()).limited_list(size).await?;
        Ok(dropdown.map_into())
    }

    /// At most `size` projected rows under the ordering in `find`.
    pub async fn get_dropdown_as<R>(
        &self,
        find: Find<E>,
        selector: Selector<E::Column, R>,
        size: u32,
    ) -> DbResult<Dropdown<R>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(entity = E::NAME, size, "Getting projected dropdown");

        self.find(find.or_newest_first()).limited_list_as(selector, size).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persists a new entity and returns the stored row as a view model.
    ///
    /// ## Errors
    /// - `DbError::Validation` if the entity is invalid
    /// - `DbError::UniqueViolation` / `ForeignKeyViolation` from the store
    pub async fn insert(&self, entity: E) -> DbResult<M> {
        entity.validate()?;

        let mut tx = self.pool.begin().await?;
        let stored = insert_row(&mut tx, &entity).await?;
        tx.commit().await?;

        debug!(entity = E::NAME, id = %stored.id(), "Inserted");
        Ok(stored.into())
    }

    /// Applies the copyable fields of `entity` to the live record `id`.
    ///
    /// Only the fields listed in the entity's `CopyFields` impl are
    /// written; identity and creation audit are kept from the stored row.
    /// `updated_by` is taken from `entity.audit()`.
    ///
    /// ## Errors
    /// `DbError::NotFound` if `id` has no live record.
    pub async fn update(&self, id: E::Id, entity: E) -> DbResult<M> {
        debug!(entity = E::NAME, id = %id, "Updating");

        let mut tx = self.pool.begin().await?;

        let mut current = load_live::<E>(&mut tx, &id)
            .await?
            .ok_or_else(|| DbError::not_found(E::NAME, &id))?;

        entity.copy_fields(&mut current);
        current.audit_mut().touch(entity.audit().updated_by);
        current.validate()?;

        let stored = update_row(&mut tx, &current).await?;
        tx.commit().await?;

        Ok(stored.into())
    }

    /// Soft-deletes the live record `id` and returns it.
    ///
    /// ## Errors
    /// `DbError::NotFound` if `id` has no live record (unknown or already
    /// deleted).
    pub async fn delete(&self, id: E::Id) -> DbResult<M> {
        debug!(entity = E::NAME, id = %id, "Soft-deleting");

        let mut tx = self.pool.begin().await?;

        let mut current = load_live::<E>(&mut tx, &id)
            .await?
            .ok_or_else(|| DbError::not_found(E::NAME, &id))?;

        current.audit_mut().mark_deleted(None);
        let stored = update_row(&mut tx, &current).await?;
        tx.commit().await?;

        Ok(stored.into())
    }

    /// Inserts all entities in one transaction. Nothing is written if any
    /// insert fails.
    pub async fn insert_range(&self, entities: Vec<E>) -> DbResult<Vec<M>> {
        debug!(entity = E::NAME, count = entities.len(), "Inserting range");

        for entity in &entities {
            entity.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(entities.len());
        for entity in &entities {
            stored.push(insert_row(&mut tx, entity).await?.into());
        }
        tx.commit().await?;

        Ok(stored)
    }

    /// Overwrites every entity's row (all columns) in one transaction.
    ///
    /// ## Errors
    /// `DbError::NotFound` for the first entity without a live row; the
    /// whole batch is rolled back.
    pub async fn update_range(&self, entities: Vec<E>) -> DbResult<Vec<M>> {
        debug!(entity = E::NAME, count = entities.len(), "Updating range");

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(entities.len());
        for mut entity in entities {
            let actor = entity.audit().updated_by;
            entity.audit_mut().touch(actor);
            entity.validate()?;
            stored.push(update_row(&mut tx, &entity).await?.into());
        }
        tx.commit().await?;

        Ok(stored)
    }

    /// Physically removes every entity's row in one transaction and returns
    /// the removed rows.
    ///
    /// ## Errors
    /// - `DbError::NotFound` for the first entity without a row
    /// - `DbError::ForeignKeyViolation` if another table still references a row
    pub async fn delete_range(&self, entities: Vec<E>) -> DbResult<Vec<M>> {
        debug!(entity = E::NAME, count = entities.len(), "Removing range");

        let mut tx = self.pool.begin().await?;
        let mut removed = Vec::with_capacity(entities.len());
        for entity in &entities {
            removed.push(delete_row::<E>(&mut tx, entity.id()).await?.into());
        }
        tx.commit().await?;

        Ok(removed)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Reads one live record by id without any tracking.
    pub async fn get_as_no_tracking(&self, id: E::Id) -> DbResult<Option<M>> {
        self.first_or_default_by_id(id).await
    }

    /// The first live record matching `find`, under its ordering.
    pub async fn first_or_default(&self, find: Find<E>) -> DbResult<Option<M>> {
        debug!(entity = E::NAME, ?find, "First or default");
        Ok(self.find(find).first().await?.map(M::from))
    }

    /// The live record with the given id.
    pub async fn first_or_default_by_id(&self, id: E::Id) -> DbResult<Option<M>> {
        debug!(entity = E::NAME, id = %id, "Getting by id");
        Ok(self.by_id(&id).first().await?.map(M::from))
    }

    /// The last live record matching `find` under its ordering (highest id
    /// when unordered).
    pub async fn last_or_default(&self, find: Find<E>) -> DbResult<Option<M>> {
        debug!(entity = E::NAME, ?find, "Last or default");
        Ok(self.find(find).last().await?.map(M::from))
    }

    /// Every live record matching `find`. Meant for bounded result sets.
    pub async fn get_all(&self, find: Find<E>) -> DbResult<Vec<M>> {
        let rows = self.find(find).fetch_all().await?;

        debug!(entity = E::NAME, count = rows.len(), "Got all");
        Ok(rows.into_iter().map(M::from).collect())
    }

    /// Whether any live record matches `filter` (any live record at all
    /// when `None`).
    pub async fn any(&self, filter: Option<Filter<E::Column>>) -> DbResult<bool> {
        let query = match filter {
            Some(filter) => self.query().filter(filter),
            None => self.query(),
        };
        query.exists().await
    }

    // =========================================================================
    // Tracking hooks
    // =========================================================================

    /// No-op: SQLite has no change tracker. Use [`Self::insert`] to persist.
    pub fn attach(&self, entity: &E) {
        trace!(entity = E::NAME, id = %entity.id(), "attach (no change tracking)");
    }

    /// No-op: SQLite has no change tracker.
    pub fn detach(&self, entity: &E) {
        trace!(entity = E::NAME, id = %entity.id(), "detach (no change tracking)");
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

/// Reads the live row `id` inside a transaction.
async fn load_live<E: SqlEntity>(conn: &mut SqliteConnection, id: &E::Id) -> DbResult<Option<E>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
    qb.push(E::TABLE);
    push_live_id::<E>(&mut qb, id);

    let row = qb.build_query_as::<E>().fetch_optional(&mut *conn).await?;
    Ok(row)
}

/// `INSERT INTO table (..) VALUES (..) RETURNING *`
async fn insert_row<E: SqlEntity>(conn: &mut SqliteConnection, entity: &E) -> DbResult<E> {
    let values = entity.insert_values();

    let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
    qb.push(E::TABLE);
    qb.push(" (");
    for (i, (column, _)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        value.push_bind(&mut qb);
    }
    qb.push(") RETURNING *");

    let row = qb.build_query_as::<E>().fetch_one(&mut *conn).await?;
    Ok(row)
}

/// `UPDATE table SET .. WHERE id = ? AND is_delete = 0 RETURNING *`
async fn update_row<E: SqlEntity>(conn: &mut SqliteConnection, entity: &E) -> DbResult<E> {
    let values = entity.values();

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE ");
    qb.push(E::TABLE);
    qb.push(" SET ");
    for (i, (column, value)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
        qb.push(" = ");
        value.push_bind(&mut qb);
    }
    push_live_id::<E>(&mut qb, entity.id());
    qb.push(" RETURNING *");

    qb.build_query_as::<E>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found(E::NAME, entity.id()))
}

/// `DELETE FROM table WHERE id = ? RETURNING *`
async fn delete_row<E: SqlEntity>(conn: &mut SqliteConnection, id: &E::Id) -> DbResult<E> {
    let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM ");
    qb.push(E::TABLE);
    qb.push(" WHERE ");
    qb.push(E::ID_COLUMN.name());
    qb.push(" = ");
    E::id_value(id).push_bind(&mut qb);
    qb.push(" RETURNING *");

    qb.build_query_as::<E>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found(E::NAME, id))
}

fn push_live_id<E: SqlEntity>(qb: &mut QueryBuilder<'_, Sqlite>, id: &E::Id) {
    qb.push(" WHERE ");
    qb.push(E::ID_COLUMN.name());
    qb.push(" = ");
    E::id_value(id).push_bind(qb);
    qb.push(" AND ");
    qb.push(E::IS_DELETE_COLUMN.name());
    qb.push(" = 0");
}
