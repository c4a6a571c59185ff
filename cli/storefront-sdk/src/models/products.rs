//! Query reconciliation.
//!
//! The remote source filters by a single category and a single price
//! interval, matches search text against titles only, and does not sort.
//! [get_products] narrows a [Query] down to what the remote source
//! understands, fetches the requested page, and then re-derives the total
//! count and the sort order locally:
//!
//! - only the first selected category is sent; the recount checks the full
//!   selection
//! - all selected price ranges collapse into one bounding interval
//! - the recount matches search text against title and description
//! - the page is sorted after fetching
//!
//! The recount is based on a second request for the complete collection.
//! If that request fails the page is still returned, with an estimated
//! total.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::collation::LocaleCollator;
use crate::models::query::{PriceRange, Query, SortDirection, SortKey};
use crate::models::snapshot::SnapshotCache;
use crate::providers::catalog::{
    CatalogClientError,
    Category,
    ClientTrait,
    Product,
    ProductParams,
};

/// Upper price bound sent when an unbounded range is selected.
pub const PRICE_MAX_SENTINEL: f64 = 10000.0;

/// Estimated total per returned item when the collection can't be recounted.
pub const HEURISTIC_TOTAL_FACTOR: u64 = 10;

/// Number of products matching a query, ignoring pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProductCount {
    /// Recounted from the complete collection.
    Exact(u64),
    /// Derived from the page size because the collection was unavailable.
    Estimated(u64),
}

impl ProductCount {
    pub fn get(&self) -> u64 {
        match self {
            ProductCount::Exact(n) | ProductCount::Estimated(n) => *n,
        }
    }
}

/// One page of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsPage {
    pub items: Vec<Product>,
    pub total: ProductCount,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to fetch categories")]
    Categories(#[source] CatalogClientError),
    #[error("failed to fetch product page")]
    Page(#[source] CatalogClientError),
}

/// Where the recount gets the complete collection from.
enum SnapshotSource<'a> {
    /// Request it for this call only.
    Fetch,
    /// Reuse a fresh snapshot, refetching and storing an expired one.
    Cache(&'a SnapshotCache),
}

/// Fetch the page of products described by `query`, sorted locally, with the
/// number of products matching the query's search text and categories.
///
/// Fails if the categories or the page can't be fetched.
/// Every call fetches the complete collection again for the recount,
/// see [get_products_with_snapshot] to reuse it between calls.
#[instrument(skip_all, fields(
    categories = query.filters.categories().len(),
    price_ranges = query.filters.price_ranges().len(),
    search = %query.search,
    page = query.pagination.page.get(),
))]
pub async fn get_products(
    client: &impl ClientTrait,
    query: &Query,
) -> Result<ProductsPage, ReconcileError> {
    reconcile(client, query, SnapshotSource::Fetch).await
}

/// Like [get_products], but takes the complete collection from `cache`
/// while it is fresh.
#[instrument(skip_all, fields(search = %query.search, page = query.pagination.page.get()))]
pub async fn get_products_with_snapshot(
    client: &impl ClientTrait,
    query: &Query,
    cache: &SnapshotCache,
) -> Result<ProductsPage, ReconcileError> {
    reconcile(client, query, SnapshotSource::Cache(cache)).await
}

async fn reconcile(
    client: &impl ClientTrait,
    query: &Query,
    snapshot_source: SnapshotSource<'_>,
) -> Result<ProductsPage, ReconcileError> {
    let category_id = match query.filters.categories().first() {
        Some(first) => {
            let categories = client
                .categories()
                .await
                .map_err(ReconcileError::Categories)?;
            let category_id = resolve_category_id(&categories, first);
            if category_id.is_none() {
                debug!(category = %first, "selected category unknown to catalog, not filtering by category");
            }
            category_id
        },
        None => None,
    };

    let params = remote_params(query, category_id);
    debug!(?params, "fetching product page");
    let mut items = client
        .products(&params)
        .await
        .map_err(ReconcileError::Page)?;

    let snapshot = match snapshot_source {
        SnapshotSource::Fetch => client.all_products().await.map(Arc::new),
        SnapshotSource::Cache(cache) => cache.get_or_fetch(client).await,
    };

    let total = match snapshot {
        Ok(snapshot) => ProductCount::Exact(count_matches(&snapshot, query)),
        Err(err) => {
            let estimate = items.len() as u64 * HEURISTIC_TOTAL_FACTOR;
            warn!(%err, estimate, "could not recount products, using estimated total");
            ProductCount::Estimated(estimate)
        },
    };

    sort_products(&mut items, query.sort_key, query.sort_direction);

    debug!(n_items = items.len(), total = total.get(), "reconciled product page");
    Ok(ProductsPage { items, total })
}

/// Fetch a single product.
#[instrument(skip(client))]
pub async fn get_product(client: &impl ClientTrait, id: u64) -> Result<Product, CatalogClientError> {
    client.product(id).await
}

/// Names of all categories, in the order the remote source lists them.
#[instrument(skip_all)]
pub async fn get_category_names(client: &impl ClientTrait) -> Result<Vec<String>, CatalogClientError> {
    let categories = client.categories().await?;
    Ok(categories.into_iter().map(|category| category.name).collect())
}

// ---------------------------------------------------------------------------
// Parameter translation
// ---------------------------------------------------------------------------

/// The id of the category called `name`.
pub fn resolve_category_id(categories: &[Category], name: &str) -> Option<u64> {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| category.id)
}

/// Collapse `ranges` into the smallest single interval covering all of them.
///
/// The lower bound is the smallest minimum. The upper bound is the largest
/// bounded maximum, or [PRICE_MAX_SENTINEL] if any range is unbounded.
/// Gaps between disjoint ranges are part of the result.
pub fn widen_price_ranges(ranges: &[PriceRange]) -> Option<(f64, f64)> {
    if ranges.is_empty() {
        return None;
    }

    let min = ranges
        .iter()
        .map(|range| range.min)
        .fold(f64::INFINITY, f64::min);
    let max = if ranges.iter().any(|range| range.max.is_none()) {
        PRICE_MAX_SENTINEL
    } else {
        ranges
            .iter()
            .filter_map(|range| range.max)
            .fold(0.0, f64::max)
    };

    Some((min, max))
}

/// Translate `query` into the parameters of the remote page request.
pub fn remote_params(query: &Query, category_id: Option<u64>) -> ProductParams {
    let (price_min, price_max) = widen_price_ranges(query.filters.price_ranges()).unzip();
    ProductParams {
        limit: query.pagination.limit.get(),
        offset: query.pagination.offset(),
        title: (!query.search.is_empty()).then(|| query.search.clone()),
        category_id,
        price_min,
        price_max,
    }
}

// ---------------------------------------------------------------------------
// Recount and sort
// ---------------------------------------------------------------------------

/// Number of products in `snapshot` matching the search text (title or
/// description, case-insensitive) and any of the selected categories.
///
/// Price ranges are not considered.
pub fn count_matches(snapshot: &[Product], query: &Query) -> u64 {
    let needle = query.search.to_lowercase();
    let categories = query.filters.categories();

    snapshot
        .iter()
        .filter(|product| matches_search(product, &needle))
        .filter(|product| categories.is_empty() || categories.contains(&product.category.name))
        .count() as u64
}

fn matches_search(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.title.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

/// Sort `products` in place, stable for equal keys.
pub fn sort_products(products: &mut [Product], key: SortKey, direction: SortDirection) {
    let mut collator = LocaleCollator::new();
    let mut compare = |a: &Product, b: &Product| match key {
        SortKey::Title => collator.compare(&a.title, &b.title),
        SortKey::Category => collator.compare(&a.category.name, &b.category.name),
        SortKey::Price => a.price.total_cmp(&b.price),
    };

    match direction {
        SortDirection::Asc => products.sort_by(|a, b| compare(a, b)),
        SortDirection::Desc => products.sort_by(|a, b| compare(a, b).reverse()),
    }
}
