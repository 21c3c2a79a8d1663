//! # Result Collections
//!
//! Value objects describing a slice of a larger result set.
//!
//! ## Paging vs Dropdown
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways to Slice a Result Set                       │
//! │                                                                         │
//! │  Paging<T>  (list screens)                                             │
//! │  ─────────                                                             │
//! │  23 matching rows, page_size = 10                                      │
//! │                                                                         │
//! │  [ 0 .. 9 ] [ 10 .. 19 ] [ 20 .. 22 ]                                  │
//! │   page 1      page 2       page 3   ← page_index = 2                   │
//! │                                                                         │
//! │  total = 23, total_pages = 3, current_page = 3                         │
//! │  has_previous_page = true, has_next_page = false                       │
//! │                                                                         │
//! │  Dropdown<T>  (select boxes)                                           │
//! │  ───────────                                                           │
//! │  First `size` rows only. No COUNT(*) round-trip, no page metadata.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both are built once per query and never mutated afterwards. Mapping the
//! rows to another type (entity → view model) keeps the metadata intact.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};

/// Page index used when the caller does not ask for one.
pub const DEFAULT_PAGE_INDEX: u32 = 0;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =============================================================================
// Paging
// =============================================================================

/// A windowed slice of a result set plus page metadata.
///
/// ## Invariants
/// - `page_size >= 1` (checked by [`Paging::new`])
/// - `current_page == 0` iff `total == 0`, otherwise `page_index + 1`
/// - `total_pages == ceil(total / page_size)`
///
/// ## Example
/// ```rust
/// use smartpos_core::Paging;
///
/// let page = Paging::new(2, 10, vec![21, 22, 23], 23).unwrap();
/// assert_eq!(page.current_page(), 3);
/// assert_eq!(page.total_pages(), 3);
/// assert!(page.has_previous_page());
/// assert!(!page.has_next_page());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Paging<T> {
    data: Vec<T>,
    #[ts(type = "number")]
    total: u64,
    page_index: u32,
    page_size: u32,
    current_page: u32,
    #[ts(type = "number")]
    total_pages: u64,
    has_previous_page: bool,
    has_next_page: bool,
}

impl<T> Paging<T> {
    /// Builds a page and derives its metadata.
    ///
    /// ## Errors
    /// `ValidationError::MustBePositive` when `page_size` is 0.
    pub fn new(page_index: u32, page_size: u32, data: Vec<T>, total: u64) -> ValidationResult<Self> {
        if page_size < 1 {
            return Err(ValidationError::must_be_positive("page_size"));
        }

        let current_page = if total == 0 { 0 } else { page_index.saturating_add(1) };
        let total_pages = total.div_ceil(u64::from(page_size));

        Ok(Paging {
            data,
            total,
            page_index,
            page_size,
            current_page,
            total_pages,
            has_previous_page: current_page > 1,
            has_next_page: u64::from(current_page) < total_pages,
        })
    }

    /// An empty first page.
    pub fn empty(page_size: u32) -> ValidationResult<Self> {
        Paging::new(DEFAULT_PAGE_INDEX, page_size, Vec::new(), 0)
    }

    /// Rows in this window, in the order the source produced them.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the page, returning its rows.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Count of all matching rows, ignoring the window.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Zero-based index of this page.
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One-based page number, 0 when there are no rows at all.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Number of rows in this window.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps every row, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Paging<U>
    where
        F: FnMut(T) -> U,
    {
        Paging {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page_index: self.page_index,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }

    /// Converts every row with `From`, e.g. entity → view model.
    pub fn map_into<U>(self) -> Paging<U>
    where
        U: From<T>,
    {
        self.map(U::from)
    }
}

// =============================================================================
// Dropdown
// =============================================================================

/// A size-capped, uncounted slice of a result set.
///
/// `data.len() <= size` always holds; a short source is never padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dropdown<T> {
    data: Vec<T>,
    size: u32,
}

impl<T> Dropdown<T> {
    /// Builds a dropdown from rows already limited to `size`.
    ///
    /// Extra rows beyond `size` are dropped so the cap holds even for a
    /// source that ignored it.
    pub fn new(mut data: Vec<T>, size: u32) -> Self {
        data.truncate(size as usize);
        Dropdown { data, size }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// The requested cap (not the number of rows returned).
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps every row, keeping the requested size.
    pub fn map<U, F>(self, f: F) -> Dropdown<U>
    where
        F: FnMut(T) -> U,
    {
        Dropdown {
            data: self.data.into_iter().map(f).collect(),
            size: self.size,
        }
    }

    pub fn map_into<U>(self) -> Dropdown<U>
    where
        U: From<T>,
    {
        self.map(U::from)
    }
}

// =============================================================================
// Page Request
// =============================================================================

/// Page coordinates as they arrive from an API query string.
///
/// Missing values fall back to page 0 with 10 rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    #[serde(default)]
    pub page_index: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        PageRequest {
            page_index,
            page_size,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let page = Paging::new(2, 10, vec![21, 22, 23], 23).unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page.total(), 23);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous_page());
        assert!(!page.has_next_page());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paging::new(0, 10, vec![0; 10], 25).unwrap();
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.current_page(), 1);
        assert!(!page.has_previous_page());
        assert!(page.has_next_page());

        let exact = Paging::new(1, 10, vec![0; 10], 20).unwrap();
        assert_eq!(exact.total_pages(), 2);
        assert!(!exact.has_next_page());
    }

    #[test]
    fn test_empty_result_has_no_current_page() {
        let page: Paging<i32> = Paging::new(0, 10, Vec::new(), 0).unwrap();

        assert_eq!(page.current_page(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_previous_page());
        assert!(!page.has_next_page());

        // Page index beyond the data still reports no current page.
        let page: Paging<i32> = Paging::new(4, 10, Vec::new(), 0).unwrap();
        assert_eq!(page.current_page(), 0);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = Paging::new(0, 0, vec![1, 2, 3], 3).unwrap_err();
        assert!(matches!(err, ValidationError::MustBePositive { ref field } if field == "page_size"));

        assert!(Paging::<i32>::empty(0).is_err());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Paging::new(1, 2, vec![3, 4], 5).unwrap();
        let mapped = page.map(|n| format!("row-{n}"));

        assert_eq!(mapped.data(), ["row-3", "row-4"]);
        assert_eq!(mapped.total(), 5);
        assert_eq!(mapped.page_index(), 1);
        assert_eq!(mapped.page_size(), 2);
        assert_eq!(mapped.current_page(), 2);
        assert_eq!(mapped.total_pages(), 3);
        assert!(mapped.has_next_page());

        let widened: Paging<i64> = Paging::new(0, 2, vec![1i32, 2], 2).unwrap().map_into();
        assert_eq!(widened.data(), [1i64, 2]);
    }

    #[test]
    fn test_dropdown_never_pads() {
        let dropdown = Dropdown::new(vec!["a", "b", "c"], 5);
        assert_eq!(dropdown.len(), 3);
        assert_eq!(dropdown.size(), 5);
    }

    #[test]
    fn test_dropdown_enforces_cap() {
        let dropdown = Dropdown::new(vec![1, 2, 3, 4], 2);
        assert_eq!(dropdown.data(), [1, 2]);

        let mapped = dropdown.map(|n| n * 10);
        assert_eq!(mapped.data(), [10, 20]);
        assert_eq!(mapped.size(), 2);
    }

    #[test]
    fn test_page_request_defaults() {
        let request: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);

        let request: PageRequest = serde_json::from_str(r#"{"page_index": 3}"#).unwrap();
        assert_eq!(request, PageRequest::new(3, 10));
    }

    #[test]
    fn test_paging_serialized_shape() {
        let page = Paging::new(0, 10, vec![1], 1).unwrap();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["total"], 1);
        assert_eq!(json["current_page"], 1);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["has_next_page"], false);
    }
}
