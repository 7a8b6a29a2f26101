//! # Filter / Sort / Paginate Pipeline
//!
//! Derives the visible product list from the full in-memory catalog.
//!
//! ## Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product List Pipeline                                │
//! │                                                                         │
//! │  all products (newest first, from the store)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. search     name / description / brand contains text (any case)     │
//! │  2. brand      brand ∈ selected set          (skipped if set empty)    │
//! │  3. status     Active | Inactive             (skipped if "all")        │
//! │  4. price      min <= price <= max           (each bound optional)     │
//! │  5. stock      low | in-stock | out-of-stock (skipped if "all")        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  6. sort       name | price | stock | createdAt, asc | desc (stable)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  7. paginate   [(page-1)*size, page*size) clamped                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure function of its inputs. The input slice is never
//! touched; each call builds a new `Vec`. Nothing is memoized: callers
//! recompute from scratch whenever any input changes.
//!
//! ## Sort Stability
//! `slice::sort_by` is stable. Descending order is produced by reversing the
//! comparator, not the output, so products with equal keys keep their input
//! order in both directions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, ProductStatus, StockLevel};

// =============================================================================
// Filter Criteria
// =============================================================================

/// Status filter: everything, or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(&self, status: ProductStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ProductStatus::Active,
            StatusFilter::Inactive => status == ProductStatus::Inactive,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["all".into(), "active".into(), "inactive".into()],
            }),
        }
    }
}

/// Stock-level filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockFilter {
    #[default]
    All,
    /// 0 < stock < 10
    Low,
    /// stock >= 10
    InStock,
    /// stock == 0
    OutOfStock,
}

impl StockFilter {
    pub fn matches(&self, stock: i64) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => StockLevel::of(stock) == StockLevel::Low,
            StockFilter::InStock => StockLevel::of(stock) == StockLevel::InStock,
            StockFilter::OutOfStock => stock == 0,
        }
    }
}

impl FromStr for StockFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StockFilter::All),
            "low" => Ok(StockFilter::Low),
            "in-stock" | "in_stock" | "instock" => Ok(StockFilter::InStock),
            "out-of-stock" | "out_of_stock" | "outofstock" => Ok(StockFilter::OutOfStock),
            _ => Err(ValidationError::NotAllowed {
                field: "stock level".to_string(),
                allowed: vec![
                    "all".into(),
                    "low".into(),
                    "in-stock".into(),
                    "out-of-stock".into(),
                ],
            }),
        }
    }
}

/// Declarative filter settings for the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text search (already debounced by the caller).
    pub search: String,
    /// Selected brand labels. Empty means "any brand".
    pub brands: BTreeSet<String>,
    pub status: StatusFilter,
    /// Inclusive lower price bound.
    pub price_min: Option<Money>,
    /// Inclusive upper price bound.
    pub price_max: Option<Money>,
    pub stock_level: StockFilter,
}

impl FilterCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brands.insert(brand.into());
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_stock_level(mut self, level: StockFilter) -> Self {
        self.stock_level = level;
        self
    }

    /// True when a product passes every active stage.
    pub fn matches(&self, product: &Product) -> bool {
        matches_search(product, &self.search)
            && matches_brands(product, &self.brands)
            && self.status.matches(product.status)
            && matches_price(product, self.price_min, self.price_max)
            && self.stock_level.matches(product.stock)
    }

    /// Number of active filter groups, as shown on the filter badge.
    ///
    /// A price range counts once even when both bounds are set.
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        if !self.brands.is_empty() {
            count += 1;
        }
        if self.status != StatusFilter::All {
            count += 1;
        }
        if self.price_min.is_some() || self.price_max.is_some() {
            count += 1;
        }
        if self.stock_level != StockFilter::All {
            count += 1;
        }
        if !self.search.trim().is_empty() {
            count += 1;
        }
        count
    }

    /// True when no stage would drop anything.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

/// Badge count for `criteria`. See [`FilterCriteria::active_count`].
pub fn active_filter_count(criteria: &FilterCriteria) -> usize {
    criteria.active_count()
}

/// Whitespace-only text means no search; otherwise the text is matched as typed.
fn matches_search(product: &Product, search: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    let needle = search.to_lowercase();

    product.name.to_lowercase().contains(&needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || product.brand.to_lowercase().contains(&needle)
}

fn matches_brands(product: &Product, brands: &BTreeSet<String>) -> bool {
    brands.is_empty() || brands.contains(&product.brand)
}

fn matches_price(product: &Product, min: Option<Money>, max: Option<Money>) -> bool {
    let price = product.price();
    min.map_or(true, |min| price >= min) && max.map_or(true, |max| price <= max)
}

// =============================================================================
// Sorting
// =============================================================================

/// Sortable product fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Price,
    Stock,
    #[default]
    CreatedAt,
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "stock" => Ok(SortField::Stock),
            "createdat" | "created_at" | "created-at" | "created" => Ok(SortField::CreatedAt),
            _ => Err(ValidationError::NotAllowed {
                field: "sort field".to_string(),
                allowed: vec!["name".into(), "price".into(), "stock".into(), "createdAt".into()],
            }),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Stock => "stock",
            SortField::CreatedAt => "createdAt",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sort order".to_string(),
                allowed: vec!["asc".into(), "desc".into()],
            }),
        }
    }
}

/// Sort key and direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        SortSpec { field, order }
    }

    /// Column-header behaviour: clicking the active field flips the order,
    /// clicking another field sorts by it ascending.
    pub fn select(self, field: SortField) -> SortSpec {
        if self.field == field {
            SortSpec::new(field, self.order.toggled())
        } else {
            SortSpec::new(field, SortOrder::Asc)
        }
    }

    /// Compares two products by this spec. Equal keys yield `Equal`.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Price => a.price_cents.cmp(&b.price_cents),
            SortField::Stock => a.stock.cmp(&b.stock),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Runs stages 1–6: filter then stable sort.
///
/// ```rust
/// use catalog_core::pipeline::{apply, FilterCriteria, SortField, SortOrder, SortSpec};
/// use catalog_core::sample::sample_products;
///
/// let products = sample_products();
/// let cheapest_first = apply(
///     &products,
///     &FilterCriteria::default(),
///     SortSpec::new(SortField::Price, SortOrder::Asc),
/// );
/// assert!(cheapest_first.windows(2).all(|w| w[0].price_cents <= w[1].price_cents));
/// ```
pub fn apply(products: &[Product], criteria: &FilterCriteria, sort: SortSpec) -> Vec<Product> {
    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|p| criteria.matches(p))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| sort.compare(a, b));
    filtered
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested (0 is normalized to 1).
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Converts the items while keeping the paging numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// `ceil(len / page_size)`; zero when `page_size` is zero.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// Index range of a 1-based page, clamped to `0..len`.
pub fn page_bounds(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(len);
    let end = page.saturating_mul(page_size).min(len);
    start..end
}

/// Stage 7: slices one page out of an already filtered and sorted list.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let range = page_bounds(items.len(), page, page_size);
    Page {
        items: items[range].to_vec(),
        page: page.max(1),
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

/// Sorted, de-duplicated brand labels present in `products`.
pub fn available_brands(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.brand.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn product(id: &str, name: &str, price: i64, stock: i64, brand: &str) -> Product {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let offset: i64 = id.trim_start_matches('p').parse().unwrap_or(0);
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price_cents: price,
            brand: brand.to_string(),
            status: ProductStatus::Active,
            stock,
            created_at: base + Duration::days(offset),
            updated_at: base + Duration::days(offset),
        }
    }

    fn catalog() -> Vec<Product> {
        let mut items = vec![
            product("p1", "Widget", 500, 0, "Acme"),
            product("p2", "gadget", 100, 9, "Globex"),
            product("p3", "Sprocket", 300, 10, "Acme"),
            product("p4", "Doohickey", 1000, 25, "Initech"),
        ];
        items[1].description = Some("Pocket-sized WIDGET helper".to_string());
        items[3].status = ProductStatus::Inactive;
        items
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn by(field: SortField, order: SortOrder) -> SortSpec {
        SortSpec::new(field, order)
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let products = catalog();
        let out = apply(&products, &FilterCriteria::default(), by(SortField::Name, SortOrder::Asc));
        assert_eq!(out.len(), products.len());
    }

    #[test]
    fn test_search_matches_name_description_and_brand() {
        let products = catalog();
        let sort = by(SortField::Price, SortOrder::Asc);

        let out = apply(&products, &FilterCriteria::default().with_search("widget"), sort);
        assert_eq!(ids(&out), vec!["p2", "p1"]);

        let out = apply(&products, &FilterCriteria::default().with_search("ACME"), sort);
        assert_eq!(ids(&out), vec!["p3", "p1"]);

        let out = apply(&products, &FilterCriteria::default().with_search("sized widget"), sort);
        assert_eq!(ids(&out), vec!["p2"]);

        let out = apply(&products, &FilterCriteria::default().with_search("   "), sort);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_search_text_is_matched_as_typed() {
        let products = vec![product("p1", "Floor Lamp", 4500, 3, "Lumen")];
        let sort = SortSpec::default();

        let out = apply(&products, &FilterCriteria::default().with_search("lamp"), sort);
        assert_eq!(out.len(), 1);

        let out = apply(&products, &FilterCriteria::default().with_search("lamp "), sort);
        assert!(out.is_empty());

        let out = apply(&products, &FilterCriteria::default().with_search(" floor"), sort);
        assert!(out.is_empty());
    }

    #[test]
    fn test_brand_filter() {
        let products = catalog();
        let criteria = FilterCriteria::default()
            .with_brand("Acme")
            .with_brand("Initech");
        let out = apply(&products, &criteria, by(SortField::Price, SortOrder::Asc));
        assert_eq!(ids(&out), vec!["p3", "p1", "p4"]);
    }

    #[test]
    fn test_status_filter() {
        let products = catalog();
        let sort = by(SortField::Price, SortOrder::Asc);

        let inactive = FilterCriteria::default().with_status(StatusFilter::Inactive);
        assert_eq!(ids(&apply(&products, &inactive, sort)), vec!["p4"]);

        let active = FilterCriteria::default().with_status(StatusFilter::Active);
        assert_eq!(apply(&products, &active, sort).len(), 3);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let products = catalog();
        let criteria = FilterCriteria::default()
            .with_price_range(Some(Money::from_cents(300)), Some(Money::from_cents(500)));
        let out = apply(&products, &criteria, by(SortField::Price, SortOrder::Asc));
        assert_eq!(ids(&out), vec!["p3", "p1"]);

        let min_only = FilterCriteria::default().with_price_range(Some(Money::from_cents(501)), None);
        assert_eq!(ids(&apply(&products, &min_only, SortSpec::default())), vec!["p4"]);
    }

    #[test]
    fn test_stock_level_boundaries() {
        let products = catalog();
        let sort = by(SortField::Stock, SortOrder::Asc);
        let run = |level| {
            let c = FilterCriteria::default().with_stock_level(level);
            ids(&apply(&products, &c, sort))
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(StockFilter::OutOfStock), vec!["p1"]);
        assert_eq!(run(StockFilter::Low), vec!["p2"]);
        assert_eq!(run(StockFilter::InStock), vec!["p3", "p4"]);
        assert_eq!(run(StockFilter::All).len(), 4);
    }

    #[test]
    fn test_every_result_satisfies_every_predicate() {
        let products = crate::sample::sample_products();
        let criteria = FilterCriteria::default()
            .with_search("e")
            .with_status(StatusFilter::Active)
            .with_price_range(Some(Money::from_major(20)), Some(Money::from_major(400)))
            .with_stock_level(StockFilter::InStock);

        let out = apply(&products, &criteria, SortSpec::default());
        assert!(!out.is_empty());
        for p in &out {
            assert!(criteria.matches(p));
        }
        let expected = products.iter().filter(|p| criteria.matches(p)).count();
        assert_eq!(out.len(), expected);
    }

    #[test]
    fn test_pipeline_is_idempotent_and_leaves_input_alone() {
        let products = catalog();
        let before = products.clone();
        let criteria = FilterCriteria::default().with_search("g");
        let sort = by(SortField::Name, SortOrder::Desc);

        let first = apply(&products, &criteria, sort);
        let second = apply(&products, &criteria, sort);
        assert_eq!(first, second);
        assert_eq!(products, before);
    }

    #[test]
    fn test_sort_by_price() {
        let products = vec![
            product("p1", "a", 500, 1, "x"),
            product("p2", "b", 100, 1, "x"),
            product("p3", "c", 300, 1, "x"),
        ];
        let asc = apply(&products, &FilterCriteria::default(), by(SortField::Price, SortOrder::Asc));
        let prices: Vec<i64> = asc.iter().map(|p| p.price_cents).collect();
        assert_eq!(prices, vec![100, 300, 500]);
    }

    #[test]
    fn test_desc_is_reverse_of_asc_for_distinct_keys() {
        let products = catalog();
        for field in [SortField::Name, SortField::Price, SortField::Stock, SortField::CreatedAt] {
            let mut asc = apply(&products, &FilterCriteria::default(), by(field, SortOrder::Asc));
            let desc = apply(&products, &FilterCriteria::default(), by(field, SortOrder::Desc));
            asc.reverse();
            assert_eq!(ids(&asc), ids(&desc), "field {}", field);
        }
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let products = catalog();
        let out = apply(&products, &FilterCriteria::default(), by(SortField::Name, SortOrder::Asc));
        assert_eq!(ids(&out), vec!["p4", "p2", "p3", "p1"]);
    }

    #[test]
    fn test_ties_keep_input_order_in_both_directions() {
        let products = vec![
            product("p1", "first", 200, 1, "x"),
            product("p2", "second", 100, 1, "x"),
            product("p3", "third", 200, 1, "x"),
        ];
        let asc = apply(&products, &FilterCriteria::default(), by(SortField::Price, SortOrder::Asc));
        assert_eq!(ids(&asc), vec!["p2", "p1", "p3"]);

        let desc = apply(&products, &FilterCriteria::default(), by(SortField::Price, SortOrder::Desc));
        assert_eq!(ids(&desc), vec!["p1", "p3", "p2"]);
    }

    #[test]
    fn test_sort_select_toggles() {
        let spec = SortSpec::default();
        assert_eq!(spec, by(SortField::CreatedAt, SortOrder::Desc));

        let spec = spec.select(SortField::Price);
        assert_eq!(spec, by(SortField::Price, SortOrder::Asc));

        let spec = spec.select(SortField::Price);
        assert_eq!(spec, by(SortField::Price, SortOrder::Desc));

        let spec = spec.select(SortField::Name);
        assert_eq!(spec, by(SortField::Name, SortOrder::Asc));
    }

    #[test]
    fn test_paginate_25_items() {
        let items: Vec<usize> = (0..25).collect();

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items, (0..12).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 3, 12);
        assert_eq!(last.items, vec![24]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_clamps() {
        let items: Vec<usize> = (0..5).collect();

        assert!(paginate(&items, 9, 12).items.is_empty());
        assert_eq!(paginate(&items, 0, 2).items, vec![0, 1]);
        assert_eq!(paginate(&items, 0, 2).page, 1);

        let empty = paginate(&items, 1, 0);
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_pages, 0);

        let none: Vec<usize> = Vec::new();
        let page = paginate(&none, 1, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_active_filter_count() {
        assert_eq!(FilterCriteria::default().active_count(), 0);

        let criteria = FilterCriteria::default()
            .with_search("x")
            .with_brand("Acme")
            .with_price_range(Some(Money::zero()), Some(Money::from_major(5)))
            .with_stock_level(StockFilter::Low);
        assert_eq!(criteria.active_count(), 4);

        let blank_search = FilterCriteria::default().with_search("  ");
        assert!(blank_search.is_empty());
    }

    #[test]
    fn test_available_brands() {
        assert_eq!(available_brands(&catalog()), vec!["Acme", "Globex", "Initech"]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("in-stock".parse::<StockFilter>().unwrap(), StockFilter::InStock);
        assert_eq!("Out-Of-Stock".parse::<StockFilter>().unwrap(), StockFilter::OutOfStock);
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("created_at".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
