//! # Entity Contracts
//!
//! The minimal capability set every persisted record and every outward
//! view model must expose so that one generic repository can serve them all.
//!
//! ## Contract Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Entity  vs  View Model                            │
//! │                                                                         │
//! │  Entity (persisted)                 EntityVm (outward)                  │
//! │  ──────────────────                 ──────────────────                  │
//! │  id: Id                   ──From──► id: Id   (same Id type)             │
//! │  business fields                    business fields                     │
//! │  audit: AuditFields                 (no audit, no soft-delete flag)     │
//! │    created_by / created_date                                            │
//! │    updated_by / updated_date                                            │
//! │    is_delete  ← soft delete                                             │
//! │    status                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Actor recorded as `created_by` when nobody else is known.
pub const SYSTEM_ACTOR_ID: i64 = 1;

// =============================================================================
// Entity Status
// =============================================================================

/// Lifecycle status of a record, independent of soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// Visible and usable (default).
    #[default]
    Active,
    /// Kept for history but hidden from selection lists by callers.
    Inactive,
}

impl EntityStatus {
    /// The stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Audit Fields
// =============================================================================

/// Audit and soft-delete columns shared by every table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditFields {
    pub created_by: i64,
    pub created_date: DateTime<Utc>,
    pub updated_by: Option<i64>,
    pub updated_date: Option<DateTime<Utc>>,
    /// Soft-delete flag. Deleted rows stay in the table but are filtered
    /// out of every default read path.
    pub is_delete: bool,
    pub status: EntityStatus,
}

impl Default for AuditFields {
    fn default() -> Self {
        AuditFields {
            created_by: SYSTEM_ACTOR_ID,
            created_date: Utc::now(),
            updated_by: None,
            updated_date: None,
            is_delete: false,
            status: EntityStatus::Active,
        }
    }
}

impl AuditFields {
    /// Audit block for a record created by `actor`.
    pub fn created_by(actor: i64) -> Self {
        AuditFields {
            created_by: actor,
            ..AuditFields::default()
        }
    }

    /// Stamps a modification. Falls back to the system actor.
    pub fn touch(&mut self, actor: Option<i64>) {
        self.updated_by = Some(actor.unwrap_or(SYSTEM_ACTOR_ID));
        self.updated_date = Some(Utc::now());
    }

    /// Marks the record as soft-deleted and stamps the modification.
    pub fn mark_deleted(&mut self, actor: Option<i64>) {
        self.is_delete = true;
        self.touch(actor);
    }
}

// =============================================================================
// Contracts
// =============================================================================

/// A persisted record with identity, audit fields and a soft-delete flag.
///
/// ## Implementing
/// ```rust
/// use smartpos_core::{AuditFields, Entity};
///
/// #[derive(Debug, Clone)]
/// struct Unit {
///     id: i64,
///     name: String,
///     audit: AuditFields,
/// }
///
/// impl Entity for Unit {
///     type Id = i64;
///     const NAME: &'static str = "Unit";
///
///     fn id(&self) -> &i64 { &self.id }
///     fn audit(&self) -> &AuditFields { &self.audit }
///     fn audit_mut(&mut self) -> &mut AuditFields { &mut self.audit }
/// }
/// ```
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Identity type. Equality is the only operation the repository needs.
    type Id: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;

    fn id(&self) -> &Self::Id;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    fn is_delete(&self) -> bool {
        self.audit().is_delete
    }

    fn status(&self) -> EntityStatus {
        self.audit().status
    }
}

/// An outward-facing projection of an entity. Identity only.
pub trait EntityVm: Send + 'static {
    type Id: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

// =============================================================================
// Unit Tests
// =============================================================================
