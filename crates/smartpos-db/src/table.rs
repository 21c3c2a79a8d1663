//! # Table Mapping
//!
//! The per-entity glue between a `smartpos-core` entity and its SQLite
//! table. Implementing [`SqlEntity`] is all an entity needs to get a full
//! [`BaseRepository`](crate::repository::base::BaseRepository).
//!
//! ## What an Entity Provides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqlEntity for Category                                                │
//! │                                                                         │
//! │  TABLE            = "categories"                                       │
//! │  Column           = CategoryColumn   (typed filter/order targets)      │
//! │  ID_COLUMN        = CategoryColumn::Id                                 │
//! │  IS_DELETE_COLUMN = CategoryColumn::IsDelete                           │
//! │  Include          = CategoryInclude  (related data on request)         │
//! │  values()         → [("category_name", ..), .., audit columns]         │
//! │  FromRow          ← derived in smartpos-core (feature "sqlx")          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::future::Future;

use smartpos_core::{AuditFields, Entity};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use crate::error::DbResult;
use crate::query::{Column, Value};

/// An entity stored in one SQLite table.
pub trait SqlEntity: Entity + for<'r> FromRow<'r, SqliteRow> + Unpin {
    /// Table name.
    const TABLE: &'static str;

    /// Columns usable in filters, orderings and selectors.
    type Column: Column;

    /// Related-data directives understood by [`SqlEntity::load_includes`].
    type Include: Copy + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Primary key column.
    const ID_COLUMN: Self::Column;

    /// Soft-delete flag column.
    const IS_DELETE_COLUMN: Self::Column;

    /// Converts an identity into a bind value.
    fn id_value(id: &Self::Id) -> Value;

    /// Column/value pairs written by UPDATE, excluding the primary key.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Column/value pairs written by INSERT.
    ///
    /// Defaults to [`SqlEntity::values`], leaving the key to SQLite's
    /// AUTOINCREMENT. Entities with caller-generated keys add the id here.
    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        self.values()
    }

    /// Loads related data for freshly fetched rows.
    fn load_includes<'a>(
        pool: &'a SqlitePool,
        rows: &'a mut [Self],
        includes: &'a [Self::Include],
    ) -> impl Future<Output = DbResult<()>> + Send + 'a {
        let _ = (pool, rows, includes);
        async { Ok(()) }
    }
}

/// Include type for entities without relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoInclude {}

/// The audit columns every table carries, in table order.
pub fn audit_values(audit: &AuditFields) -> Vec<(&'static str, Value)> {
    vec![
        ("created_by", Value::from(audit.created_by)),
        ("created_date", Value::from(audit.created_date)),
        ("updated_by", Value::from(audit.updated_by)),
        ("updated_date", Value::from(audit.updated_date)),
        ("is_delete", Value::from(audit.is_delete)),
        ("status", Value::from(audit.status)),
    ]
}
