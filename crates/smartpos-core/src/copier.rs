//! # Field Copier
//!
//! Shallow copy of same-named, same-typed fields from one value onto another.
//!
//! `update` uses this to apply an incoming record onto the freshly loaded
//! row without touching identity or creation audit fields.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  impl_copy_fields!(Incoming => Stored { name, price, audit.status })   │
//! │                                                                         │
//! │  Incoming { name, price, internal_flag }                               │
//! │      │ name  ──────────────► Stored.name                                │
//! │      │ price ──────────────► Stored.price                               │
//! │      │ internal_flag         (not listed: untouched)                    │
//! │                                                                         │
//! │  A listed field that is missing on either side, or whose types         │
//! │  differ, is a compile error instead of a silent no-op.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Copies the shared fields of `Self` onto a `Dst`.
pub trait CopyFields<Dst: ?Sized> {
    /// Overwrites every shared field of `dst` with this value's field.
    fn copy_fields(&self, dst: &mut Dst);
}

/// Implements [`CopyFields`] for a (source, destination) pair.
///
/// Fields may be nested paths such as `audit.status`.
///
/// ## Example
/// ```rust
/// use smartpos_core::{impl_copy_fields, CopyFields};
///
/// struct Draft { name: String, price: i64, internal_flag: bool }
/// struct Item { name: String, price: i64 }
///
/// impl_copy_fields!(Draft => Item { name, price });
///
/// let draft = Draft { name: "Tea".into(), price: 250, internal_flag: true };
/// let mut item = Item { name: "Coffee".into(), price: 300 };
/// draft.copy_fields(&mut item);
///
/// assert_eq!(item.name, "Tea");
/// assert_eq!(item.price, 250);
/// ```
#[macro_export]
macro_rules! impl_copy_fields {
    ($src:ty => $dst:ty { $($($field:ident).+),* $(,)? }) => {
        impl $crate::copier::CopyFields<$dst> for $src {
            fn copy_fields(&self, dst: &mut $dst) {
                $(
                    dst.$($field).+ = ::std::clone::Clone::clone(&self.$($field).+);
                )*
            }
        }
    };
}
