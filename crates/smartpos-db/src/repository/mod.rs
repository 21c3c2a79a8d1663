//! # Repository Module
//!
//! One generic repository plus the table mapping for each entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Generic Repository                                   │
//! │                                                                         │
//! │  API handler                                                           │
//! │       │                                                                 │
//! │       │  db.categories().get_page(0, 10, Find::new())                  │
//! │       ▼                                                                 │
//! │  BaseRepository<Category, CategoryVm>   ← base.rs (all entities)       │
//! │       │                                                                 │
//! │       │  SqlEntity for Category         ← category.rs (table mapping)  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Adding an entity = Entity + CopyFields + Validate (smartpos-core)     │
//! │                   + SqlEntity + a migration. No repository code.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`base::BaseRepository`] - Generic CRUD, paging, dropdowns, projections
//! - [`category::CategoryRepository`] - Categories (+ products include)
//! - [`product::ProductRepository`] - Products (+ SKU lookup, search)

pub mod base;
pub mod category;
pub mod product;
