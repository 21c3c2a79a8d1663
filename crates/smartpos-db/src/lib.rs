//! # smartpos-db: Data Access Layer for SmartPOS
//!
//! Generic repository, paging and dropdown queries over SQLite (sqlx).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SmartPOS Data Flow                               │
//! │                                                                         │
//! │  API handler (get categories, page 2)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   smartpos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   BaseRepository<E, M>                                          │   │
//! │  │     │  Find<E> (filter / order / include)                       │   │
//! │  │     ▼                                                           │   │
//! │  │   EntityQuery<E> ──► PagingExt::paginate                        │   │
//! │  │     │                DropdownExt::limited_list                  │   │
//! │  │     ▼                                                           │   │
//! │  │   QueryBuilder SQL  (soft-delete guard, bound values)           │   │
//! │  │     │                                                           │   │
//! │  │     ▼                                                           │   │
//! │  │   Paging<E> ──map_into──► Paging<M>   (M: From<E>)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (migrations embedded)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool settings, TOML file and environment overrides
//! - [`pool`] - `Database` handle and repository registry
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`query`] - Typed filters, orderings, selectors and `Find` criteria
//! - [`source`] - Countable/windowable query sources
//! - [`paging`] - Paging and dropdown extension traits
//! - [`table`] - Entity-to-table mapping (`SqlEntity`)
//! - [`repository`] - Generic repository and per-entity mappings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartpos_db::{Database, DbConfig, Find};
//!
//! let db = Database::new(DbConfig::load("smartpos.toml")?).await?;
//!
//! let page = db.categories().get_page(0, 10, Find::new()).await?;
//! println!("{} of {} categories", page.len(), page.total());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod paging;
pub mod pool;
pub mod query;
pub mod repository;
pub mod source;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use paging::{DropdownExt, PagingExt};
pub use pool::Database;
pub use query::{Column, CompareOp, Direction, Filter, Find, Order, Selector, Value};
pub use source::{EntityQuery, Project, ProjectedQuery, QuerySource, Window};
pub use table::{NoInclude, SqlEntity};

// Repository re-exports for convenience
pub use repository::base::BaseRepository;
pub use repository::category::{CategoryColumn, CategoryInclude, CategoryRepository};
pub use repository::product::{ProductColumn, ProductRepository};
