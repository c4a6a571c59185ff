//! The local query: filters, search text, sort order and pagination.
//!
//! A [Query] is a plain value. Callers build one per request and hand it to
//! [crate::models::products::get_products]; nothing here talks to the remote
//! source.

use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// The price bands offered for filtering.
pub static PRICE_RANGE_PRESETS: LazyLock<Vec<PriceRange>> = LazyLock::new(|| {
    vec![
        PriceRange::new("Under $50", 0.0, Some(50.0)),
        PriceRange::new("$50 - $100", 50.0, Some(100.0)),
        PriceRange::new("$100 - $200", 100.0, Some(200.0)),
        PriceRange::new("$200 - $500", 200.0, Some(500.0)),
        PriceRange::new("$500 - $1000", 500.0, Some(1000.0)),
        PriceRange::new("Over $1000", 1000.0, None),
    ]
});

/// Look up one of the [PRICE_RANGE_PRESETS] by its label.
pub fn price_range_preset(label: &str) -> Option<&'static PriceRange> {
    PRICE_RANGE_PRESETS.iter().find(|range| range.label == label)
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Title,
    Price,
    Category,
}

#[derive(Debug, Error)]
#[error("unknown sort key '{0}', expected one of: title, price, category")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "price" => Ok(SortKey::Price),
            "category" => Ok(SortKey::Category),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortKey::Title => "title",
            SortKey::Price => "price",
            SortKey::Category => "category",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A price band `[min, max)`, unbounded above if `max` is `None`.
///
/// The label is the identity of a range: two ranges with the same label are
/// the same selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub label: String,
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(label: impl Into<String>, min: f64, max: Option<f64>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }
}

/// Selected categories and price ranges.
///
/// Both are sets that remember insertion order: the first selected category
/// is the one the remote source gets to filter by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    categories: Vec<String>,
    price_ranges: Vec<PriceRange>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.select_category(name);
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.select_price_range(range);
        self
    }

    /// Selected category names in selection order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Selected price ranges in selection order.
    pub fn price_ranges(&self) -> &[PriceRange] {
        &self.price_ranges
    }

    /// Add a category, returns `false` if it was already selected.
    pub fn select_category(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.categories.contains(&name) {
            return false;
        }
        self.categories.push(name);
        true
    }

    /// Remove a category, returns `false` if it was not selected.
    pub fn deselect_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|selected| selected != name);
        self.categories.len() != before
    }

    /// Add a price range, returns `false` if a range with the same label was
    /// already selected.
    pub fn select_price_range(&mut self, range: PriceRange) -> bool {
        if self.price_ranges.iter().any(|r| r.label == range.label) {
            return false;
        }
        self.price_ranges.push(range);
        true
    }

    /// Remove the price range with `label`, returns `false` if none was
    /// selected.
    pub fn deselect_price_range(&mut self, label: &str) -> bool {
        let before = self.price_ranges.len();
        self.price_ranges.retain(|range| range.label != label);
        self.price_ranges.len() != before
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.price_ranges.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.price_ranges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: NonZeroU32,
    pub limit: NonZeroU32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: NonZeroU32::MIN,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Number of items before the first item of this page.
    ///
    /// Computed in `u64`, the product of two `u32` always fits.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.limit.get())
    }

    /// Number of pages needed to show `total` items.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.get()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page {page} is out of range (1..={total_pages})")]
pub struct PageOutOfRange {
    pub page: u32,
    pub total_pages: u64,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Everything that determines which products are listed and how.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Filters,
    pub search: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub pagination: Pagination,
}

impl Query {
    /// Sort by `key`: choosing the current key again flips the direction,
    /// choosing a different key sorts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_direction = self.sort_direction.reversed();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Asc;
        }
    }

    /// Move to `page` if it exists for a result of `total` products.
    ///
    /// Leaves the query unchanged otherwise.
    pub fn go_to_page(&mut self, page: u32, total: u64) -> Result<(), PageOutOfRange> {
        let total_pages = self.pagination.total_pages(total);
        match NonZeroU32::new(page) {
            Some(page) if u64::from(page.get()) <= total_pages => {
                self.pagination.page = page;
                Ok(())
            },
            _ => Err(PageOutOfRange { page, total_pages }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_query_lists_first_page_by_title() {
        let query = Query::default();
        assert!(query.filters.is_empty());
        assert_eq!(query.search, "");
        assert_eq!(query.sort_key, SortKey::Title);
        assert_eq!(query.sort_direction, SortDirection::Asc);
        assert_eq!(query.pagination.page.get(), 1);
        assert_eq!(query.pagination.limit.get(), 10);
        assert_eq!(query.pagination.offset(), 0);
    }

    #[test]
    fn offset_is_derived_from_page_and_limit() {
        let pagination = Pagination {
            page: NonZeroU32::new(3).unwrap(),
            limit: NonZeroU32::new(25).unwrap(),
        };
        assert_eq!(pagination.offset(), 50);
    }

    #[test]
    fn offset_of_last_possible_page_is_exact() {
        let pagination = Pagination {
            page: NonZeroU32::MAX,
            limit: NonZeroU32::new(100).unwrap(),
        };
        assert_eq!(pagination.offset(), 429_496_729_400);
        assert!(pagination.offset() > u64::from(u32::MAX));
    }

    #[test]
    fn total_pages_rounds_up() {
        let pagination = Pagination::default();
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(10), 1);
        assert_eq!(pagination.total_pages(23), 3);
    }

    #[test]
    fn categories_keep_selection_order_without_duplicates() {
        let mut filters = Filters::new();
        assert!(filters.select_category("Electronics"));
        assert!(filters.select_category("Books"));
        assert!(!filters.select_category("Electronics"));
        assert_eq!(filters.categories(), ["Electronics", "Books"]);

        assert!(filters.deselect_category("Electronics"));
        assert!(!filters.deselect_category("Electronics"));
        assert_eq!(filters.categories(), ["Books"]);
    }

    #[test]
    fn price_ranges_are_identified_by_label() {
        let mut filters = Filters::new();
        assert!(filters.select_price_range(PriceRange::new("Cheap", 0.0, Some(10.0))));
        // same label, different bounds: still the same selection
        assert!(!filters.select_price_range(PriceRange::new("Cheap", 0.0, Some(20.0))));
        assert_eq!(filters.price_ranges().len(), 1);

        assert!(filters.deselect_price_range("Cheap"));
        assert!(filters.is_empty());
    }

    #[test]
    fn clear_removes_all_filters() {
        let mut filters = Filters::new()
            .with_category("Shoes")
            .with_price_range(price_range_preset("Over $1000").unwrap().clone());
        filters.clear();
        assert!(filters.is_empty());
    }

    #[test]
    fn presets_cover_prices_without_gaps() {
        for price in [0.0, 49.99, 50.0, 150.0, 999.0, 1000.0, 25_000.0] {
            let matching = PRICE_RANGE_PRESETS
                .iter()
                .filter(|range| price >= range.min && range.max.is_none_or(|max| price < max))
                .count();
            assert_eq!(matching, 1, "price {price} should be in exactly one preset");
        }
        assert_eq!(price_range_preset("Over $1000").unwrap().max, None);
        assert!(price_range_preset("Over $9000").is_none());
    }

    #[test]
    fn toggle_sort_flips_direction_of_current_key() {
        let mut query = Query::default();
        query.toggle_sort(SortKey::Title);
        assert_eq!(query.sort_direction, SortDirection::Desc);
        query.toggle_sort(SortKey::Title);
        assert_eq!(query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn toggle_sort_switches_key_ascending() {
        let mut query = Query {
            sort_direction: SortDirection::Desc,
            ..Default::default()
        };
        query.toggle_sort(SortKey::Price);
        assert_eq!(query.sort_key, SortKey::Price);
        assert_eq!(query.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn go_to_page_rejects_pages_outside_result() {
        let mut query = Query::default();
        assert_eq!(query.go_to_page(3, 23), Ok(()));
        assert_eq!(query.pagination.page.get(), 3);

        assert_eq!(
            query.go_to_page(4, 23),
            Err(PageOutOfRange {
                page: 4,
                total_pages: 3
            })
        );
        assert!(query.go_to_page(0, 23).is_err());
        assert_eq!(query.pagination.page.get(), 3);
    }

    #[test]
    fn sort_key_parses_case_insensitively() {
        assert_eq!("Price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!(SortKey::Category.to_string(), "category");
        assert!("rating".parse::<SortKey>().is_err());
    }
}
