//! # Catalog View
//!
//! The list screen's settings: filters, sort and page. Any filter change or
//! page size change sends the user back to page 1.

use catalog_core::pipeline::{
    self, FilterCriteria, Page, SortField, SortSpec, StatusFilter, StockFilter,
};
use catalog_core::{Money, Product, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView {
    criteria: FilterCriteria,
    sort: SortSpec,
    page: usize,
    page_size: usize,
}

impl Default for CatalogView {
    fn default() -> Self {
        CatalogView::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogView {
    pub fn new(page_size: usize) -> Self {
        CatalogView {
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: 1,
            page_size,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn active_filter_count(&self) -> usize {
        pipeline::active_filter_count(&self.criteria)
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Replaces all criteria at once.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.page = 1;
    }

    /// Adds the brand if unselected, removes it otherwise.
    pub fn toggle_brand(&mut self, brand: &str) {
        if !self.criteria.brands.remove(brand) {
            self.criteria.brands.insert(brand.to_string());
        }
        self.page = 1;
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.criteria.status = status;
        self.page = 1;
    }

    pub fn set_price_range(&mut self, min: Option<Money>, max: Option<Money>) {
        self.criteria.price_min = min;
        self.criteria.price_max = max;
        self.page = 1;
    }

    pub fn set_stock_level(&mut self, level: StockFilter) {
        self.criteria.stock_level = level;
        self.page = 1;
    }

    /// Clears every filter but keeps the search text.
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default().with_search(self.criteria.search.clone());
        self.page = 1;
    }

    // -------------------------------------------------------------------------
    // Sort & Pages
    // -------------------------------------------------------------------------

    /// Column header click: same field flips the order, a new one sorts ascending.
    pub fn sort_by(&mut self, field: SortField) {
        self.sort = self.sort.select(field);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Moves forward unless already on the last page.
    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Runs the pipeline over `products` with the current settings.
    pub fn render(&self, products: &[Product]) -> Page<Product> {
        let visible = pipeline::apply(products, &self.criteria, self.sort);
        pipeline::paginate(&visible, self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::pipeline::SortOrder;
    use catalog_core::sample::sample_products;

    #[test]
    fn test_filters_reset_page() {
        let mut view = CatalogView::new(6);

        view.set_page(3);
        view.set_search("pro");
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.toggle_brand("Books");
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_status(StatusFilter::Active);
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_price_range(Some(Money::from_major(10)), None);
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_stock_level(StockFilter::Low);
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_page_size(24);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut view = CatalogView::new(6);
        view.set_page(2);
        view.sort_by(SortField::Price);
        assert_eq!(view.page(), 2);
        assert_eq!(view.sort(), SortSpec::new(SortField::Price, SortOrder::Asc));

        view.sort_by(SortField::Price);
        assert_eq!(view.sort().order, SortOrder::Desc);
    }

    #[test]
    fn test_toggle_brand() {
        let mut view = CatalogView::default();
        view.toggle_brand("Books");
        assert!(view.criteria().brands.contains("Books"));
        assert_eq!(view.active_filter_count(), 1);

        view.toggle_brand("Books");
        assert!(view.criteria().brands.is_empty());
        assert_eq!(view.active_filter_count(), 0);
    }

    #[test]
    fn test_clear_filters_keeps_search() {
        let mut view = CatalogView::default();
        view.set_search("tea");
        view.toggle_brand("Books");
        view.set_stock_level(StockFilter::OutOfStock);

        view.clear_filters();
        assert_eq!(view.criteria().search, "tea");
        assert_eq!(view.active_filter_count(), 1);
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut view = CatalogView::new(12);
        view.previous_page();
        assert_eq!(view.page(), 1);

        view.next_page(2);
        view.next_page(2);
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_render() {
        let products = sample_products();
        let mut view = CatalogView::new(12);

        let first = view.render(&products);
        assert_eq!(first.total_items, 22);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 12);

        view.next_page(first.total_pages);
        assert_eq!(view.render(&products).items.len(), 10);

        view.toggle_brand("Books");
        let books = view.render(&products);
        assert_eq!(books.page, 1);
        assert_eq!(books.total_items, 3);
        assert!(books.items.iter().all(|p| p.brand == "Books"));
    }
}
