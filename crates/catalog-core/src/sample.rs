//! # Sample Catalog
//!
//! The built-in product list used to seed an empty local product cache.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{Product, ProductStatus};

/// Category labels used by the sample catalog.
pub const SAMPLE_CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Books",
    "Home & Garden",
    "Sports",
    "Beauty",
    "Automotive",
    "Food & Beverages",
];

type Ymd = (i32, u32, u32);

// (name, description, price in whole units, category, status, stock, created, updated)
const ROWS: [(&str, &str, i64, &str, ProductStatus, i64, Ymd, Ymd); 22] = [
    ("iPhone 15 Pro", "Latest flagship smartphone with A17 Pro chip and titanium design", 999, "Electronics", ProductStatus::Active, 25, (2024, 1, 15), (2024, 7, 15)),
    ("Nike Air Max 270", "Comfortable running shoes with Max Air unit", 150, "Sports", ProductStatus::Active, 45, (2024, 2, 1), (2024, 7, 10)),
    ("The Psychology of Money", "Timeless lessons on wealth, greed, and happiness by Morgan Housel", 15, "Books", ProductStatus::Active, 120, (2024, 1, 20), (2024, 7, 12)),
    ("Dyson V15 Detect", "Cordless vacuum cleaner with laser dust detection", 750, "Home & Garden", ProductStatus::Active, 8, (2024, 3, 5), (2024, 7, 18)),
    ("MacBook Air M3", "Ultra-thin laptop with M3 chip and 18-hour battery life", 1299, "Electronics", ProductStatus::Active, 15, (2024, 2, 10), (2024, 7, 20)),
    ("Levi's 501 Original Jeans", "Classic straight-leg denim jeans in vintage wash", 89, "Clothing", ProductStatus::Active, 65, (2024, 1, 25), (2024, 7, 8)),
    ("Tesla Model Y Accessories Kit", "Complete accessories package for Tesla Model Y", 450, "Automotive", ProductStatus::Inactive, 0, (2024, 3, 15), (2024, 7, 5)),
    ("Organic Green Tea", "Premium organic green tea leaves from Japan", 25, "Food & Beverages", ProductStatus::Active, 200, (2024, 2, 20), (2024, 7, 22)),
    ("Fenty Beauty Foundation", "Full coverage foundation with 50 inclusive shades", 36, "Beauty", ProductStatus::Active, 85, (2024, 3, 1), (2024, 7, 16)),
    ("Sony WH-1000XM5 Headphones", "Industry-leading noise canceling wireless headphones", 399, "Electronics", ProductStatus::Active, 32, (2024, 1, 30), (2024, 7, 14)),
    ("Yoga Mat Premium", "Non-slip eco-friendly yoga mat with alignment lines", 68, "Sports", ProductStatus::Active, 75, (2024, 2, 14), (2024, 7, 11)),
    ("Atomic Habits", "An Easy & Proven Way to Build Good Habits by James Clear", 18, "Books", ProductStatus::Active, 150, (2024, 1, 18), (2024, 7, 19)),
    ("Smart Garden Kit", "Indoor hydroponic garden system with LED grow lights", 199, "Home & Garden", ProductStatus::Active, 22, (2024, 3, 10), (2024, 7, 17)),
    ("Wireless Gaming Mouse", "High-precision gaming mouse with RGB lighting", 79, "Electronics", ProductStatus::Active, 95, (2024, 2, 25), (2024, 7, 13)),
    ("Cashmere Scarf", "Luxurious 100% cashmere scarf in multiple colors", 120, "Clothing", ProductStatus::Active, 28, (2024, 1, 12), (2024, 7, 9)),
    ("Car Phone Mount", "Magnetic dashboard phone holder with 360° rotation", 29, "Automotive", ProductStatus::Active, 180, (2024, 3, 20), (2024, 7, 21)),
    ("Premium Coffee Beans", "Single-origin arabica coffee beans from Colombia", 32, "Food & Beverages", ProductStatus::Active, 90, (2024, 2, 8), (2024, 7, 7)),
    ("Skincare Routine Set", "Complete 5-step skincare routine for all skin types", 89, "Beauty", ProductStatus::Active, 42, (2024, 1, 28), (2024, 7, 15)),
    ("Basketball", "Official size basketball with superior grip", 35, "Sports", ProductStatus::Active, 125, (2024, 2, 15), (2024, 7, 12)),
    ("Sapiens", "A Brief History of Humankind by Yuval Noah Harari", 22, "Books", ProductStatus::Active, 88, (2024, 1, 22), (2024, 7, 18)),
    ("Smart Thermostat", "WiFi-enabled programmable thermostat with energy saving features", 249, "Home & Garden", ProductStatus::Active, 16, (2024, 3, 8), (2024, 7, 20)),
    ("Vintage Watch", "Classic analog watch with leather strap - limited edition", 299, "Electronics", ProductStatus::Inactive, 3, (2024, 1, 5), (2024, 7, 6)),
];

fn midnight((year, month, day): Ymd) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Returns a fresh copy of the sample catalog.
///
/// Ids are `"1"` through `"22"` so seeded caches stay stable across runs.
pub fn sample_products() -> Vec<Product> {
    ROWS.iter()
        .enumerate()
        .map(
            |(i, &(name, description, price, brand, status, stock, created, updated))| Product {
                id: (i + 1).to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                price_cents: price * 100,
                brand: brand.to_string(),
                status,
                stock,
                created_at: midnight(created),
                updated_at: midnight(updated),
            },
        )
        .collect()
}
