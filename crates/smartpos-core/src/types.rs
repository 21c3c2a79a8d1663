//! # Domain Types
//!
//! Persisted entities and their view models.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   From    ┌─────────────────┐                      │
//! │  │    Category     │ ◄───────► │   CategoryVm    │                      │
//! │  │  id (i64)       │           │  id             │                      │
//! │  │  category_name  │           │  category_name  │                      │
//! │  │  products ──┐   │           │  products       │                      │
//! │  └─────────────┼───┘           └─────────────────┘                      │
//! │                │ 1..n (loaded on request)                               │
//! │  ┌─────────────▼───┐   From    ┌─────────────────┐                      │
//! │  │    Product      │ ◄───────► │   ProductVm     │                      │
//! │  │  category_id    │           │  category_id    │                      │
//! │  │  sku, name      │           │  sku, name      │                      │
//! │  │  price_cents    │           │  price_cents    │                      │
//! │  └─────────────────┘           └─────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mapping goes both ways: entity → view model for responses, view model →
//! entity for incoming create/update payloads. A view model carries no audit
//! data, so the reverse mapping starts from fresh audit defaults.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::{AuditFields, Entity, EntityVm};
use crate::error::ValidationError;
use crate::validation::{
    validate_barcode, validate_description, validate_name, validate_price_cents, validate_sku,
    validate_tax_rate_bps, Validate, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Database-assigned identifier (0 until inserted).
    pub id: i64,

    pub category_name: String,

    pub category_description: String,

    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub audit: AuditFields,

    /// Live products of this category. Empty unless explicitly included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub products: Vec<Product>,
}

impl Category {
    /// Creates an unsaved category.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Category {
            id: 0,
            category_name: name.into(),
            category_description: description.into(),
            audit: AuditFields::default(),
            products: Vec::new(),
        }
    }
}

impl Entity for Category {
    type Id = i64;
    const NAME: &'static str = "Category";

    fn id(&self) -> &i64 {
        &self.id
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

crate::impl_copy_fields!(Category => Category {
    category_name,
    category_description,
    audit.status,
});

impl Validate for Category {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("category_name", &self.category_name)?;
        validate_description("category_description", &self.category_description)?;
        Ok(())
    }
}

/// Outward representation of a [`Category`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryVm {
    #[ts(type = "number")]
    pub id: i64,
    pub category_name: String,
    pub category_description: String,
    /// Always serialized; empty unless products were included.
    #[serde(default)]
    pub products: Vec<ProductVm>,
}

impl EntityVm for CategoryVm {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl From<Category> for CategoryVm {
    fn from(category: Category) -> Self {
        CategoryVm {
            id: category.id,
            category_name: category.category_name,
            category_description: category.category_description,
            products: category.products.into_iter().map(ProductVm::from).collect(),
        }
    }
}

impl From<CategoryVm> for Category {
    fn from(vm: CategoryVm) -> Self {
        Category {
            id: vm.id,
            category_name: vm.category_name,
            category_description: vm.category_description,
            audit: AuditFields::default(),
            products: vm.products.into_iter().map(Product::from).collect(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Database-assigned identifier (0 until inserted).
    pub id: i64,

    /// Owning category.
    pub category_id: i64,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for margin reports).
    pub cost_cents: Option<i64>,

    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: u32,

    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub audit: AuditFields,
}

impl Product {
    /// Creates an unsaved product in the given category.
    pub fn new(category_id: i64, sku: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Product {
            id: 0,
            category_id,
            sku: sku.into(),
            barcode: None,
            name: name.into(),
            description: None,
            price_cents,
            cost_cents: None,
            tax_rate_bps: 0,
            audit: AuditFields::default(),
        }
    }
}

impl Entity for Product {
    type Id = i64;
    const NAME: &'static str = "Product";

    fn id(&self) -> &i64 {
        &self.id
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

crate::impl_copy_fields!(Product => Product {
    category_id,
    sku,
    barcode,
    name,
    description,
    price_cents,
    cost_cents,
    tax_rate_bps,
    audit.status,
});

impl Validate for Product {
    fn validate(&self) -> ValidationResult<()> {
        validate_sku(&self.sku)?;
        validate_name("name", &self.name)?;
        if let Some(barcode) = &self.barcode {
            validate_barcode(barcode)?;
        }
        if let Some(description) = &self.description {
            validate_description("description", description)?;
        }
        validate_price_cents("price_cents", self.price_cents)?;
        if let Some(cost) = self.cost_cents {
            validate_price_cents("cost_cents", cost)?;
        }
        validate_tax_rate_bps(self.tax_rate_bps)?;
        if self.category_id <= 0 {
            return Err(ValidationError::must_be_positive("category_id"));
        }
        Ok(())
    }
}

/// Outward representation of a [`Product`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVm {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub category_id: i64,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "number")]
    pub price_cents: i64,
    pub tax_rate_bps: u32,
}

impl EntityVm for ProductVm {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl From<Product> for ProductVm {
    fn from(product: Product) -> Self {
        ProductVm {
            id: product.id,
            category_id: product.category_id,
            sku: product.sku,
            barcode: product.barcode,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            tax_rate_bps: product.tax_rate_bps,
        }
    }
}

impl From<ProductVm> for Product {
    fn from(vm: ProductVm) -> Self {
        Product {
            id: vm.id,
            category_id: vm.category_id,
            sku: vm.sku,
            barcode: vm.barcode,
            name: vm.name,
            description: vm.description,
            price_cents: vm.price_cents,
            cost_cents: None,
            tax_rate_bps: vm.tax_rate_bps,
            audit: AuditFields::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copier::CopyFields;
    use crate::entity::EntityStatus;

    #[test]
    fn test_category_round_trip_mapping() {
        let mut category = Category::new("Beverages", "Soft drinks and juice");
        category.id = 12;
        category.products.push(Product::new(12, "COKE-330", "Coca-Cola 330ml", 199));

        let vm = CategoryVm::from(category.clone());
        assert_eq!(vm.id, 12);
        assert_eq!(vm.category_name, "Beverages");
        assert_eq!(vm.products.len(), 1);
        assert_eq!(vm.products[0].sku, "COKE-330");

        let back = Category::from(vm);
        assert_eq!(back.id, category.id);
        assert_eq!(back.category_name, category.category_name);
        assert!(!back.audit.is_delete);
    }

    #[test]
    fn test_category_copy_keeps_identity_and_audit() {
        let mut stored = Category::new("Snacks", "");
        stored.id = 3;
        stored.audit.created_by = 77;

        let mut incoming = Category::new("Salty Snacks", "Chips and pretzels");
        incoming.audit.status = EntityStatus::Inactive;
        incoming.audit.is_delete = true;

        incoming.copy_fields(&mut stored);

        assert_eq!(stored.id, 3);
        assert_eq!(stored.category_name, "Salty Snacks");
        assert_eq!(stored.category_description, "Chips and pretzels");
        assert_eq!(stored.audit.status, EntityStatus::Inactive);
        assert_eq!(stored.audit.created_by, 77);
        assert!(!stored.audit.is_delete);
    }

    #[test]
    fn test_product_validation() {
        let product = Product::new(1, "COKE-330", "Coca-Cola 330ml", 199);
        assert!(product.validate().is_ok());

        let orphan = Product::new(0, "COKE-330", "Coca-Cola 330ml", 199);
        assert!(orphan.validate().is_err());

        let mut negative = Product::new(1, "COKE-330", "Coca-Cola 330ml", -1);
        assert!(negative.validate().is_err());
        negative.price_cents = 0;
        negative.barcode = Some("not-a-barcode".to_string());
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_category_validation() {
        assert!(Category::new("Dairy", "").validate().is_ok());
        assert!(Category::new("   ", "").validate().is_err());
    }

    #[test]
    fn test_category_json_flattens_audit() {
        let category = Category::new("Frozen", "");
        let json = serde_json::to_value(&category).unwrap();

        assert_eq!(json["category_name"], "Frozen");
        assert_eq!(json["is_delete"], false);
        assert_eq!(json["status"], "active");
        assert!(json.get("products").is_none());
    }

    #[test]
    fn test_category_vm_json_matches_binding() {
        let json = serde_json::to_value(CategoryVm::default()).unwrap();
        let fields = json.as_object().unwrap();
        let decl = CategoryVm::decl();

        assert_eq!(json["products"], serde_json::json!([]));
        assert!(decl.contains("products: Array<ProductVm>"));

        // every serialized key is a required field of the binding, and back
        for key in fields.keys() {
            assert!(decl.contains(&format!("{key}: ")), "{key} missing from {decl}");
            assert!(!decl.contains(&format!("{key}?")), "{key} optional in {decl}");
        }
        assert_eq!(decl.matches(": ").count(), fields.len());

        let back: CategoryVm = serde_json::from_value(serde_json::json!({
            "id": 4,
            "category_name": "Dairy",
            "category_description": "",
        }))
        .unwrap();
        assert!(back.products.is_empty());
    }
}
