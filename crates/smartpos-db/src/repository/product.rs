//! # Product Repository
//!
//! Table mapping for products and the product-specific lookups.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Product Search Works                             │
//! │                                                                         │
//! │  User types: "coke"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sku LIKE '%coke%' OR name LIKE '%coke%' OR barcode LIKE '%coke%'      │
//! │       │              (ASCII case-insensitive in SQLite)                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ COKE-330  | Coca-Cola 330ml | 54490... │ ← MATCH                   │
//! │  │ COKE-500  | Coca-Cola 500ml | 54490... │ ← MATCH                   │
//! │  │ PEPSI-330 | Pepsi 330ml     | 12345... │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Dropdown { data: [COKE-330, COKE-500], size: limit }  (name order)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use smartpos_core::{Dropdown, Product, ProductVm};
use tracing::debug;

use crate::error::DbResult;
use crate::paging::DropdownExt;
use crate::query::{Column, Filter, Find, Value};
use crate::repository::base::BaseRepository;
use crate::table::{audit_values, NoInclude, SqlEntity};

/// Repository for products.
///
/// ## Usage
/// ```rust,ignore
/// let products = db.products();
///
/// let coke = products.find_by_sku("COKE-330").await?;
/// let matches = products.search("coke", 20).await?;
/// ```
pub type ProductRepository = BaseRepository<Product, ProductVm>;

/// Columns of the `products` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Id,
    CategoryId,
    Sku,
    Barcode,
    Name,
    Description,
    PriceCents,
    CostCents,
    TaxRateBps,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
    IsDelete,
    Status,
}

impl Column for ProductColumn {
    fn name(&self) -> &'static str {
        match self {
            ProductColumn::Id => "id",
            ProductColumn::CategoryId => "category_id",
            ProductColumn::Sku => "sku",
            ProductColumn::Barcode => "barcode",
            ProductColumn::Name => "name",
            ProductColumn::Description => "description",
            ProductColumn::PriceCents => "price_cents",
            ProductColumn::CostCents => "cost_cents",
            ProductColumn::TaxRateBps => "tax_rate_bps",
            ProductColumn::CreatedBy => "created_by",
            ProductColumn::CreatedDate => "created_date",
            ProductColumn::UpdatedBy => "updated_by",
            ProductColumn::UpdatedDate => "updated_date",
            ProductColumn::IsDelete => "is_delete",
            ProductColumn::Status => "status",
        }
    }
}

impl SqlEntity for Product {
    const TABLE: &'static str = "products";

    type Column = ProductColumn;
    type Include = NoInclude;

    const ID_COLUMN: ProductColumn = ProductColumn::Id;
    const IS_DELETE_COLUMN: ProductColumn = ProductColumn::IsDelete;

    fn id_value(id: &i64) -> Value {
        Value::Int(*id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("category_id", Value::from(self.category_id)),
            ("sku", Value::from(self.sku.as_str())),
            ("barcode", Value::from(self.barcode.clone())),
            ("name", Value::from(self.name.as_str())),
            ("description", Value::from(self.description.clone())),
            ("price_cents", Value::from(self.price_cents)),
            ("cost_cents", Value::from(self.cost_cents)),
            ("tax_rate_bps", Value::from(self.tax_rate_bps)),
        ];
        values.extend(audit_values(&self.audit));
        values
    }
}

impl ProductRepository {
    /// Gets the live product with the given SKU.
    ///
    /// ## Returns
    /// * `Ok(Some(ProductVm))` - Product found
    /// * `Ok(None)` - No live product has this SKU
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<Option<ProductVm>> {
        debug!(sku = %sku, "Getting product by SKU");

        self.first_or_default(Find::filtered(Filter::eq(ProductColumn::Sku, sku.trim())))
            .await
    }

    /// Substring search over SKU, name and barcode, ordered by name.
    ///
    /// An empty query lists live products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Dropdown<ProductVm>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let mut products = self.query().order_by(ProductColumn::Name);
        if !query.is_empty() {
            products = products.filter(
                Filter::contains(ProductColumn::Sku, query)
                    .or(Filter::contains(ProductColumn::Name, query))
                    .or(Filter::contains(ProductColumn::Barcode, query)),
            );
        }

        let found = products.limited_list(limit).await?;
        debug!(count = found.len(), "Search returned products");
        Ok(found.map_into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use smartpos_core::Category;

    use super::*;
    use crate::config::DbConfig;
    use crate::error::DbError;
    use crate::pool::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db
            .categories()
            .insert(Category::new("Beverages", "Drinks"))
            .await
            .unwrap();
        (db, category.id)
    }

    fn coke(category_id: i64) -> Product {
        let mut product = Product::new(category_id, "COKE-330", "Coca-Cola 330ml", 199);
        product.barcode = Some("5449000000996".to_string());
        product.cost_cents = Some(120);
        product.tax_rate_bps = 825;
        product
    }

    #[tokio::test]
    async fn test_insert_and_find_by_sku() {
        let (db, category_id) = setup().await;
        let products = db.products();

        let saved = products.insert(coke(category_id)).await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.tax_rate_bps, 825);
        assert_eq!(saved.barcode.as_deref(), Some("5449000000996"));

        let found = products.find_by_sku(" COKE-330 ").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);

        assert!(products.find_by_sku("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_unique_violation() {
        let (db, category_id) = setup().await;
        let products = db.products();

        products.insert(coke(category_id)).await.unwrap();
        let err = products.insert(coke(category_id)).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "products.sku"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_category_is_foreign_key_violation() {
        let (db, _) = setup().await;

        let err = db.products().insert(coke(999)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_deleted_product_is_not_found_by_sku() {
        let (db, category_id) = setup().await;
        let products = db.products();

        let saved = products.insert(coke(category_id)).await.unwrap();
        products.delete(saved.id).await.unwrap();

        assert!(products.find_by_sku("COKE-330").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_product_frees_its_sku() {
        let (db, category_id) = setup().await;
        let products = db.products();

        let first = products.insert(coke(category_id)).await.unwrap();
        products.delete(first.id).await.unwrap();

        let second = products.insert(coke(category_id)).await.unwrap();
        assert_ne!(second.id, first.id);

        let found = products.find_by_sku("COKE-330").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);

        // Still unique among live rows.
        let err = products.insert(coke(category_id)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_writes_copyable_fields() {
        let (db, category_id) = setup().await;
        let products = db.products();
        let saved = products.insert(coke(category_id)).await.unwrap();

        let mut incoming = Product::from(saved.clone());
        incoming.price_cents = 219;
        incoming.cost_cents = Some(130);

        let updated = products.update(saved.id, incoming).await.unwrap();
        assert_eq!(updated.price_cents, 219);
        assert_eq!(updated.sku, "COKE-330");

        let row = db
            .query::<Product>()
            .filter(Filter::eq(ProductColumn::Id, saved.id))
            .first()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.cost_cents, Some(130));
        assert!(row.audit.updated_date.is_some());
    }

    #[tokio::test]
    async fn test_search() {
        let (db, category_id) = setup().await;
        let products = db.products();

        products
            .insert_range(vec![
                coke(category_id),
                Product::new(category_id, "COKE-500", "Coca-Cola 500ml", 249),
                Product::new(category_id, "PEPSI-330", "Pepsi 330ml", 189),
            ])
            .await
            .unwrap();

        let found = products.search("coke", 20).await.unwrap();
        let skus: Vec<&str> = found.data().iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["COKE-330", "COKE-500"]);

        let by_barcode = products.search("544900", 20).await.unwrap();
        assert_eq!(by_barcode.len(), 1);

        let all = products.search("  ", 2).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.data()[0].name, "Coca-Cola 330ml");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let (db, category_id) = setup().await;
        let products = db.products();

        products
            .insert_range(vec![
                coke(category_id),
                Product::new(category_id, "TEA_GRN", "Green Tea 50% off", 149),
            ])
            .await
            .unwrap();

        let underscore = products.search("_", 10).await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore.data()[0].sku, "TEA_GRN");

        let percent = products.search("%", 10).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent.data()[0].sku, "TEA_GRN");

        assert!(products.search(r"\", 10).await.unwrap().is_empty());
    }
}
