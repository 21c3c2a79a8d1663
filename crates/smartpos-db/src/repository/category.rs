//! # Category Repository
//!
//! Table mapping for categories, plus the products include.
//!
//! ## Including Products
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Find::new().include(CategoryInclude::Products)                        │
//! │                                                                         │
//! │  1. SELECT * FROM categories WHERE is_delete = 0 ...   → [3, 7]        │
//! │  2. SELECT * FROM products                                             │
//! │     WHERE is_delete = 0 AND (category_id IN (?, ?))                    │
//! │     ORDER BY id ASC                                                    │
//! │  3. Attach each product to its category                                │
//! │                                                                         │
//! │  Two round-trips regardless of how many categories were loaded.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use smartpos_core::{Category, CategoryVm, Product};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{Column, Filter, Value};
use crate::repository::base::BaseRepository;
use crate::repository::product::ProductColumn;
use crate::source::EntityQuery;
use crate::table::{audit_values, SqlEntity};

/// Repository for categories.
pub type CategoryRepository = BaseRepository<Category, CategoryVm>;

/// Columns of the `categories` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    Id,
    CategoryName,
    CategoryDescription,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
    IsDelete,
    Status,
}

impl Column for CategoryColumn {
    fn name(&self) -> &'static str {
        match self {
            CategoryColumn::Id => "id",
            CategoryColumn::CategoryName => "category_name",
            CategoryColumn::CategoryDescription => "category_description",
            CategoryColumn::CreatedBy => "created_by",
            CategoryColumn::CreatedDate => "created_date",
            CategoryColumn::UpdatedBy => "updated_by",
            CategoryColumn::UpdatedDate => "updated_date",
            CategoryColumn::IsDelete => "is_delete",
            CategoryColumn::Status => "status",
        }
    }
}

/// Related data that can be loaded with categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryInclude {
    /// Live products of each category, id ascending.
    Products,
}

impl SqlEntity for Category {
    const TABLE: &'static str = "categories";

    type Column = CategoryColumn;
    type Include = CategoryInclude;

    const ID_COLUMN: CategoryColumn = CategoryColumn::Id;
    const IS_DELETE_COLUMN: CategoryColumn = CategoryColumn::IsDelete;

    fn id_value(id: &i64) -> Value {
        Value::Int(*id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("category_name", Value::from(self.category_name.as_str())),
            ("category_description", Value::from(self.category_description.as_str())),
        ];
        values.extend(audit_values(&self.audit));
        values
    }

    fn load_includes<'a>(
        pool: &'a SqlitePool,
        rows: &'a mut [Self],
        includes: &'a [CategoryInclude],
    ) -> impl Future<Output = DbResult<()>> + Send + 'a {
        async move {
            if !includes.contains(&CategoryInclude::Products) {
                return Ok(());
            }

            let ids: Vec<i64> = rows.iter().map(|category| category.id).collect();
            let products = EntityQuery::<Product>::new(pool.clone())
                .filter(Filter::in_list(ProductColumn::CategoryId, ids))
                .order_by(ProductColumn::Id)
                .fetch_all()
                .await?;

            for category in rows.iter_mut() {
                category.products = products
                    .iter()
                    .filter(|product| product.category_id == category.id)
                    .cloned()
                    .collect();
            }

            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use smartpos_core::{EntityStatus, Validate};

    use super::*;
    use crate::config::DbConfig;
    use crate::error::DbError;
    use crate::pool::Database;
    use crate::query::{Find, Selector};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed(repo: &CategoryRepository, n: usize) -> Vec<CategoryVm> {
        let categories = (1..=n)
            .map(|i| Category::new(format!("Category {i:02}"), format!("Description {i}")))
            .collect();
        repo.insert_range(categories).await.unwrap()
    }

    #[derive(Debug, sqlx::FromRow)]
    struct CategoryOption {
        id: i64,
        category_name: String,
    }

    #[tokio::test]
    async fn test_insert_returns_stored_row() {
        let db = setup().await;
        let repo = db.categories();

        let saved = repo.insert(Category::new("Beverages", "Soft drinks")).await.unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.category_name, "Beverages");
        assert!(saved.products.is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_entity() {
        let db = setup().await;

        let err = db.categories().insert(Category::new("  ", "")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_third_page_of_twenty_three() {
        let db = setup().await;
        let repo = db.categories();
        seed(&repo, 23).await;

        let page = repo
            .get_page(2, 10, Find::new().order_by(CategoryColumn::Id))
            .await
            .unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page.total(), 23);
        assert_eq!(page.current_page(), 3);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next_page());
        assert!(page.has_previous_page());
        assert_eq!(page.data()[0].category_name, "Category 21");
    }

    #[tokio::test]
    async fn test_page_defaults_to_newest_first() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 5).await;

        let page = repo.get_page(0, 2, Find::new()).await.unwrap();

        let ids: Vec<i64> = page.data().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![saved[4].id, saved[3].id]);
        assert!(page.has_next_page());
    }

    #[tokio::test]
    async fn test_empty_table_page() {
        let db = setup().await;

        let page = db.categories().get_page(0, 10, Find::new()).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(page.current_page(), 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_coerced() {
        let db = setup().await;
        let repo = db.categories();
        seed(&repo, 3).await;

        let page = repo.get_page(0, 0, Find::new()).await.unwrap();

        assert_eq!(page.page_size(), 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_hidden() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 4).await;

        let removed = repo.delete(saved[1].id).await.unwrap();
        assert_eq!(removed.id, saved[1].id);

        let page = repo.get_page(0, 10, Find::new()).await.unwrap();
        assert_eq!(page.total(), 3);
        assert!(page.data().iter().all(|c| c.id != saved[1].id));

        let all = repo.get_all(Find::new()).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_name = Find::filtered(Filter::eq(CategoryColumn::CategoryName, "Category 02"));
        assert!(repo.first_or_default(by_name).await.unwrap().is_none());
        assert!(repo.first_or_default_by_id(saved[1].id).await.unwrap().is_none());
        assert!(repo.get_as_no_tracking(saved[1].id).await.unwrap().is_none());

        assert!(!repo
            .any(Some(Filter::eq(CategoryColumn::Id, saved[1].id)))
            .await
            .unwrap());
        assert!(repo.any(None).await.unwrap());

        let dropdown = repo.get_dropdown(None, 10).await.unwrap();
        assert_eq!(dropdown.len(), 3);

        // still physically present
        let raw = db
            .query::<Category>()
            .with_deleted()
            .filter(Filter::eq(CategoryColumn::Id, saved[1].id))
            .first()
            .await
            .unwrap()
            .unwrap();
        assert!(raw.audit.is_delete);
        assert!(raw.audit.updated_date.is_some());

        for category in saved.iter().filter(|c| c.id != saved[1].id) {
            repo.delete(category.id).await.unwrap();
        }
        assert!(!repo.any(None).await.unwrap());
        assert_eq!(repo.get_page(0, 10, Find::new()).await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn test_any_on_empty_table() {
        let db = setup().await;
        assert!(!db.categories().any(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = setup().await;
        let repo = db.categories();

        let err = repo.delete(999).await.unwrap_err();
        assert!(err.is_not_found());

        let saved = repo.insert(Category::new("Dairy", "")).await.unwrap();
        repo.delete(saved.id).await.unwrap();

        let err = repo.delete(saved.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = setup().await;

        let err = db
            .categories()
            .update(42, Category::new("Ghost", ""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Category not found: 42");
    }

    #[tokio::test]
    async fn test_update_copies_fields_and_stamps_audit() {
        let db = setup().await;
        let repo = db.categories();
        let saved = repo.insert(Category::new("Snacks", "")).await.unwrap();

        let mut incoming = Category::new("Salty Snacks", "Chips and pretzels");
        incoming.id = 555;
        incoming.audit.created_by = 99;
        incoming.audit.updated_by = Some(7);
        incoming.audit.is_delete = true;
        incoming.audit.status = EntityStatus::Inactive;

        let updated = repo.update(saved.id, incoming).await.unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.category_name, "Salty Snacks");
        assert_eq!(updated.category_description, "Chips and pretzels");

        let stored = db
            .query::<Category>()
            .filter(Filter::eq(CategoryColumn::Id, saved.id))
            .first()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.audit.created_by, smartpos_core::SYSTEM_ACTOR_ID);
        assert_eq!(stored.audit.updated_by, Some(7));
        assert!(stored.audit.updated_date.is_some());
        assert!(!stored.audit.is_delete);
        assert_eq!(stored.audit.status, EntityStatus::Inactive);
    }

    #[tokio::test]
    async fn test_dropdown_caps_and_never_pads() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 3).await;

        let dropdown = repo.get_dropdown(None, 5).await.unwrap();
        assert_eq!(dropdown.len(), 3);
        assert_eq!(dropdown.size(), 5);
        assert_eq!(dropdown.data()[0].id, saved[2].id);

        let filtered = repo
            .get_dropdown(Some(Filter::contains(CategoryColumn::CategoryName, "01")), 5)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let capped = repo.get_dropdown(None, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_projected_page_and_dropdown() {
        let db = setup().await;
        let repo = db.categories();
        seed(&repo, 12).await;

        let selector = Selector::<_, CategoryOption>::new([CategoryColumn::Id, CategoryColumn::CategoryName]);

        let page = repo
            .get_page_as(1, 5, Find::new().order_by(CategoryColumn::CategoryName), selector.clone())
            .await
            .unwrap();
        assert_eq!(page.total(), 12);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.current_page(), 2);
        assert_eq!(page.data()[0].category_name, "Category 06");
        assert!(page.data()[0].id > 0);

        let dropdown = repo.get_dropdown_as(Find::new(), selector, 4).await.unwrap();
        assert_eq!(dropdown.len(), 4);
        assert_eq!(dropdown.data()[0].category_name, "Category 12");
    }

    #[tokio::test]
    async fn test_first_and_last_or_default() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 4).await;

        let last = repo.last_or_default(Find::new()).await.unwrap().unwrap();
        assert_eq!(last.id, saved[3].id);

        let by_name_desc = Find::new().order_by_desc(CategoryColumn::CategoryName);
        let first = repo.first_or_default(by_name_desc.clone()).await.unwrap().unwrap();
        assert_eq!(first.category_name, "Category 04");
        let last = repo.last_or_default(by_name_desc).await.unwrap().unwrap();
        assert_eq!(last.category_name, "Category 01");

        let none = repo
            .last_or_default(Find::filtered(Filter::eq(CategoryColumn::CategoryName, "missing")))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_include_products() {
        let db = setup().await;
        let categories = db.categories();
        let products = db.products();

        let drinks = categories.insert(Category::new("Drinks", "")).await.unwrap();
        let snacks = categories.insert(Category::new("Snacks", "")).await.unwrap();

        products
            .insert_range(vec![
                Product::new(drinks.id, "COKE-330", "Coca-Cola 330ml", 199),
                Product::new(drinks.id, "TEA-500", "Iced Tea 500ml", 249),
                Product::new(snacks.id, "CHIPS-150", "Salted Chips 150g", 299),
            ])
            .await
            .unwrap();
        let gone = products
            .insert(Product::new(drinks.id, "OLD-1", "Discontinued", 99))
            .await
            .unwrap();
        products.delete(gone.id).await.unwrap();

        let loaded = categories
            .get_all(
                Find::new()
                    .order_by(CategoryColumn::Id)
                    .include(CategoryInclude::Products),
            )
            .await
            .unwrap();

        assert_eq!(loaded.len(), 2);
        let skus: Vec<&str> = loaded[0].products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["COKE-330", "TEA-500"]);
        assert_eq!(loaded[1].products.len(), 1);

        let plain = categories.get_all(Find::new()).await.unwrap();
        assert!(plain.iter().all(|c| c.products.is_empty()));
    }

    #[tokio::test]
    async fn test_range_operations() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 3).await;

        let names: Vec<&str> = saved.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Category 01", "Category 02", "Category 03"]);

        let renamed: Vec<Category> = saved
            .iter()
            .cloned()
            .map(|vm| {
                let mut category = Category::from(vm);
                category.category_name = format!("{} (renamed)", category.category_name);
                category
            })
            .collect();
        let updated = repo.update_range(renamed.clone()).await.unwrap();
        assert_eq!(updated.len(), 3);
        assert_eq!(updated[2].category_name, "Category 03 (renamed)");

        let removed = repo.delete_range(renamed[..2].to_vec()).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].id, saved[0].id);

        let remaining = db.query::<Category>().with_deleted().fetch_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, saved[2].id);
    }

    #[tokio::test]
    async fn test_update_range_rolls_back_on_missing_row() {
        let db = setup().await;
        let repo = db.categories();
        let saved = seed(&repo, 1).await;

        let mut existing = Category::from(saved[0].clone());
        existing.category_name = "Changed".to_string();
        let mut ghost = Category::new("Ghost", "");
        ghost.id = 404;

        let err = repo.update_range(vec![existing, ghost]).await.unwrap_err();
        assert!(err.is_not_found());

        let stored = repo.first_or_default_by_id(saved[0].id).await.unwrap().unwrap();
        assert_eq!(stored.category_name, "Category 01");
    }

    #[tokio::test]
    async fn test_insert_range_is_atomic() {
        let db = setup().await;
        let repo = db.categories();

        let err = repo
            .insert_range(vec![Category::new("Valid", ""), Category::new("", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(!repo.any(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_attach_and_detach_are_noops() {
        let db = setup().await;
        let repo = db.categories();
        let category = Category::new("Detached", "");
        assert!(category.validate().is_ok());

        repo.attach(&category);
        repo.detach(&category);

        assert!(!repo.any(None).await.unwrap());
    }
}
