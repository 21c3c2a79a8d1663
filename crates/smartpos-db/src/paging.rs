//! # Paging & Dropdown Extensions
//!
//! Turns any [`QuerySource`] into a [`Paging`] or [`Dropdown`] container.
//!
//! ## Paging Round-Trips
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    paginate(page_index = 2, page_size = 10)             │
//! │                                                                         │
//! │  1. count()                    → total = 23                            │
//! │       │                                                                 │
//! │       ├── total == 0 ? ──────► Paging { data: [], current_page: 0 }    │
//! │       │                        (no second round-trip)                   │
//! │       ▼                                                                 │
//! │  2. fetch(skip = 20, take = 10) → 3 rows                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Paging { total: 23, current_page: 3, total_pages: 3,                  │
//! │           has_previous_page: true, has_next_page: false }              │
//! │                                                                         │
//! │  limited_list(size = 5)                                                │
//! │  1. fetch(take = 5)            → at most 5 rows, never counted         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither extension orders anything; rows come back in whatever order the
//! source was given.

use std::future::Future;

use smartpos_core::{Dropdown, Paging};
use tracing::debug;

use crate::error::DbResult;
use crate::source::{Project, QuerySource, Window};

/// Page-index/page-size paging over a [`QuerySource`].
///
/// ## Example
/// ```rust,ignore
/// let page = db
///     .query::<Category>()
///     .order_by_desc(CategoryColumn::Id)
///     .paginate(0, 10)
///     .await?;
/// ```
pub trait PagingExt: QuerySource + Sized {
    /// Counts the source, then fetches one window of at most `page_size`
    /// rows starting at `page_size * page_index`.
    ///
    /// A `page_size` of 0 is treated as 1.
    fn paginate(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> impl Future<Output = DbResult<Paging<Self::Item>>> + Send {
        async move {
            let skip = u64::from(page_size) * u64::from(page_index);
            let page_size = page_size.max(1);

            let total = self.count().await?;
            let data = if total == 0 {
                Vec::new()
            } else {
                self.fetch(Window::new(skip, u64::from(page_size))).await?
            };

            debug!(page_index, page_size, total, rows = data.len(), "Paginated");
            Ok(Paging::new(page_index, page_size, data, total)?)
        }
    }

    /// Paging over a projection of the source.
    ///
    /// For database queries the projection runs server-side: only the
    /// selected columns are read.
    fn paginate_as<P>(
        self,
        projection: P,
        page_index: u32,
        page_size: u32,
    ) -> impl Future<Output = DbResult<Paging<<Self::Output as QuerySource>::Item>>> + Send
    where
        Self: Project<P>,
        P: Send,
    {
        async move {
            let projected = self.project(projection);
            projected.paginate(page_index, page_size).await
        }
    }
}

impl<S: QuerySource> PagingExt for S {}

/// Size-capped, uncounted listing over a [`QuerySource`].
pub trait DropdownExt: QuerySource + Sized {
    /// Fetches at most `size` rows. No count is issued.
    fn limited_list(&self, size: u32) -> impl Future<Output = DbResult<Dropdown<Self::Item>>> + Send {
        async move {
            let data = self.fetch(Window::first(u64::from(size))).await?;

            debug!(size, rows = data.len(), "Limited list");
            Ok(Dropdown::new(data, size))
        }
    }

    /// Dropdown over a projection of the source.
    fn limited_list_as<P>(
        self,
        projection: P,
        size: u32,
    ) -> impl Future<Output = DbResult<Dropdown<<Self::Output as QuerySource>::Item>>> + Send
    where
        Self: Project<P>,
        P: Send,
    {
        async move {
            let projected = self.project(projection);
            projected.limited_list(size).await
        }
    }
}

impl<S: QuerySource> DropdownExt for S {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Records every round-trip made against it.
    struct CountingSource {
        rows: Vec<u32>,
        counts: AtomicUsize,
        fetches: AtomicUsize,
        last_window: Mutex<Option<Window>>,
    }

    impl CountingSource {
        fn with_rows(n: u32) -> Self {
            CountingSource {
                rows: (1..=n).collect(),
                counts: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
                last_window: Mutex::new(None),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn last_window(&self) -> Option<Window> {
            *self.last_window.lock().unwrap()
        }
    }

    impl QuerySource for CountingSource {
        type Item = u32;

        async fn count(&self) -> DbResult<u64> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.len() as u64)
        }

        async fn fetch(&self, window: Window) -> DbResult<Vec<u32>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            *self.last_window.lock().unwrap() = Some(window);
            self.rows.fetch(window).await
        }
    }

    #[tokio::test]
    async fn test_empty_source_skips_fetch() {
        let source = CountingSource::with_rows(0);

        let page = source.paginate(0, 10).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total(), 0);
        assert_eq!(page.current_page(), 0);
        assert_eq!(page.total_pages(), 0);
        assert_eq!(source.counts.load(Ordering::SeqCst), 1);
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_last_page_is_short() {
        let source = CountingSource::with_rows(23);

        let page = source.paginate(2, 10).await.unwrap();

        assert_eq!(page.data(), &[21, 22, 23]);
        assert_eq!(page.total(), 23);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous_page());
        assert!(!page.has_next_page());
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.last_window(), Some(Window::new(20, 10)));
    }

    #[tokio::test]
    async fn test_page_never_exceeds_page_size() {
        let source = CountingSource::with_rows(25);

        for page_size in 1..=30 {
            let page = source.paginate(0, page_size).await.unwrap();
            assert!(page.len() <= page_size as usize);
            assert_eq!(page.total(), 25);
            assert_eq!(page.total_pages(), 25u64.div_ceil(u64::from(page_size)));
        }
    }

    #[tokio::test]
    async fn test_page_beyond_end_is_empty_but_counted() {
        let source = CountingSource::with_rows(5);

        let page = source.paginate(4, 10).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total(), 5);
        assert_eq!(page.current_page(), 5);
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn test_zero_page_size_is_coerced() {
        let source = CountingSource::with_rows(4);

        let page = source.paginate(3, 0).await.unwrap();

        assert_eq!(page.page_size(), 1);
        assert_eq!(page.total_pages(), 4);
        // skip is computed from the raw size, so the window starts at 0
        assert_eq!(source.last_window(), Some(Window::new(0, 1)));
        assert_eq!(page.data(), &[1]);
    }

    #[tokio::test]
    async fn test_limited_list_never_counts_or_pads() {
        let source = CountingSource::with_rows(3);

        let dropdown = source.limited_list(5).await.unwrap();

        assert_eq!(dropdown.data(), &[1, 2, 3]);
        assert_eq!(dropdown.size(), 5);
        assert_eq!(source.counts.load(Ordering::SeqCst), 0);
        assert_eq!(source.last_window(), Some(Window::first(5)));
    }

    #[tokio::test]
    async fn test_projection_variants_on_vec() {
        let names = vec!["cola", "tea", "juice"];

        let page = names
            .clone()
            .paginate_as(|name: &str| name.len(), 0, 2)
            .await
            .unwrap();
        assert_eq!(page.data(), &[4, 3]);
        assert_eq!(page.total(), 3);
        assert!(page.has_next_page());

        let dropdown = names
            .limited_list_as(|name: &str| name.to_uppercase(), 2)
            .await
            .unwrap();
        assert_eq!(dropdown.data(), &["COLA".to_string(), "TEA".to_string()]);
    }
}
