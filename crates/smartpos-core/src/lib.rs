//! # smartpos-core: Contracts and Containers for SmartPOS Data Access
//!
//! This crate holds everything the data-access layer needs that does not
//! touch the database: result containers, entity contracts, the field
//! copier, domain types and validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SmartPOS Data Access                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 API layer (not in this workspace)               │   │
//! │  │        GET /categories?page_index=0&page_size=10                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    smartpos-db                                  │   │
//! │  │       BaseRepository<E, M>, paging/dropdown extensions          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ smartpos-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐  │   │
//! │  │   │ collection │ │   entity   │ │   copier   │ │   types    │  │   │
//! │  │   │  Paging    │ │  Entity    │ │ CopyFields │ │  Category  │  │   │
//! │  │   │  Dropdown  │ │  EntityVm  │ │            │ │  Product   │  │   │
//! │  │   └────────────┘ └────────────┘ └────────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`collection`] - `Paging<T>`, `Dropdown<T>`, `PageRequest`
//! - [`entity`] - `Entity` / `EntityVm` contracts and audit fields
//! - [`copier`] - compile-time checked shallow field copy
//! - [`types`] - `Category`, `Product` and their view models
//! - [`validation`] - per-model validation
//! - [`error`] - `ValidationError`
//!
//! ## Example Usage
//!
//! ```rust
//! use smartpos_core::{Category, CategoryVm, Paging};
//!
//! let mut category = Category::new("Beverages", "Soft drinks");
//! category.id = 1;
//!
//! let page = Paging::new(0, 10, vec![category], 1).unwrap();
//! let page: Paging<CategoryVm> = page.map_into();
//!
//! assert_eq!(page.data()[0].category_name, "Beverages");
//! assert_eq!(page.current_page(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod copier;
pub mod entity;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collection::{Dropdown, PageRequest, Paging, DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE};
pub use copier::CopyFields;
pub use entity::{AuditFields, Entity, EntityStatus, EntityVm, SYSTEM_ACTOR_ID};
pub use error::{ValidationError, ValidationResult};
pub use types::*;
pub use validation::Validate;
