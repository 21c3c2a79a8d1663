//! # Seed Data Generator
//!
//! Populates the database with categories and products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p smartpos-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p smartpos-db --bin seed -- --count 2000
//!
//! # Specify database path or config file
//! cargo run -p smartpos-db --bin seed -- --db ./data/smartpos.db
//! cargo run -p smartpos-db --bin seed -- --config ./smartpos.toml
//! ```
//!
//! ## Generated Data
//! One category per entry in `CATEGORIES`; products cycle through the
//! category's names and `SIZES`:
//! - Unique SKU: `{CODE}-{NAME}-{INDEX}`
//! - Price: $1.99 - $9.99 plus a size add-on
//! - Tax rate: 0%, 5%, 8.25% or 10%

use std::env;

use smartpos_core::{Category, Product};
use smartpos_db::{Database, DbConfig, Find};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (code, category name, description, product names)
const CATEGORIES: &[(&str, &str, &str, &[&str])] = &[
    (
        "BEV",
        "Beverages",
        "Soft drinks, water and juice",
        &["Cola", "Lemon Soda", "Sparkling Water", "Orange Juice", "Iced Tea", "Energy Drink"],
    ),
    (
        "SNK",
        "Snacks",
        "Chips, candy and cookies",
        &["Salted Chips", "Cheese Puffs", "Pretzels", "Chocolate Bar", "Gummy Bears", "Oat Cookies"],
    ),
    (
        "DRY",
        "Dairy",
        "Milk, cheese and yogurt",
        &["Whole Milk", "Skim Milk", "Cheddar", "Greek Yogurt", "Butter", "Cream Cheese"],
    ),
    (
        "FRZ",
        "Frozen",
        "Ice cream and frozen meals",
        &["Vanilla Ice Cream", "Frozen Pizza", "Fish Sticks", "Frozen Peas", "Waffles", "Sorbet"],
    ),
    (
        "GRO",
        "Grocery",
        "Pantry staples",
        &["Spaghetti", "White Rice", "Canned Beans", "Peanut Butter", "Honey", "Flour"],
    ),
];

/// Size variants and their price add-on in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 350),
];

/// Tax rates in basis points
const TAX_RATES: &[u32] = &[0, 500, 825, 1000];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path: Option<String> = None;
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SmartPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("      --config <PATH>  TOML config file (default: ./smartpos.toml)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = DbConfig::load(config_path.as_deref().unwrap_or("smartpos.toml"))?;
    if let Some(path) = db_path {
        config.database_path = path.into();
    }

    info!(path = %config.database_path.display(), count, "Seeding database");
    let db = Database::new(config).await?;

    if db.categories().any(None).await? {
        warn!("Database already has categories; skipping seed to avoid duplicates");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (code, name, description, products) in CATEGORIES {
        let category = db.categories().insert(Category::new(*name, *description)).await?;

        let per_category = count.div_ceil(CATEGORIES.len());
        let batch: Vec<Product> = (0..per_category)
            .take(count.saturating_sub(generated))
            .map(|n| generate_product(category.id, code, products, n))
            .collect();

        let inserted = db.products().insert_range(batch).await?;
        generated += inserted.len();
        info!(category = %name, products = inserted.len(), "Seeded category");
    }

    let elapsed = start.elapsed();
    info!(
        products = generated,
        elapsed_ms = elapsed.as_millis() as u64,
        "Seed complete"
    );

    let page = db.products().get_page(0, 10, Find::new()).await?;
    println!(
        "Products: {} total, {} pages of {}",
        page.total(),
        page.total_pages(),
        page.page_size()
    );
    for product in page.data() {
        println!("  {:<24} {:<32} {:>6}", product.sku, product.name, product.price_cents);
    }

    let found = db.products().search("cola", 10).await?;
    println!("Search 'cola': {} results", found.len());

    db.close().await;
    Ok(())
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,smartpos_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Generates the `n`-th product of a category.
fn generate_product(category_id: i64, code: &str, names: &[&str], n: usize) -> Product {
    let name = names[n % names.len()];
    let (size, price_addon) = SIZES[(n / names.len()) % SIZES.len()];

    let short: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}-{}-{:04}", code, short, n);

    let base_price = 199 + ((n * 17) % 800) as i64;
    let mut product = Product::new(category_id, sku, format!("{} {}", name, size), base_price + price_addon);

    product.barcode = Some(format!("590{:02}{:08}", category_id % 100, n));
    product.cost_cents = Some(product.price_cents * (60 + (n % 20) as i64) / 100);
    product.tax_rate_bps = TAX_RATES[n % TAX_RATES.len()];
    product
}
