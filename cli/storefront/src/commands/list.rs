use std::num::NonZeroU32;

use anyhow::{Result, bail};
use bpaf::Bpaf;
use itertools::Itertools;
use serde::Serialize;
use storefront_sdk::models::presentation::{Priority, StockStatus};
use storefront_sdk::models::products::{ProductCount, ProductsPage, get_products};
use storefront_sdk::models::query::{
    DEFAULT_PAGE_SIZE,
    Filters,
    PRICE_RANGE_PRESETS,
    PageOutOfRange,
    Pagination,
    Query,
    SortDirection,
    SortKey,
    price_range_preset,
};
use storefront_sdk::providers::catalog::{Client, Product};
use tracing::instrument;

use crate::config::Config;
use crate::utils::message;

// List products matching filters
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Only list products of this category
    ///
    /// Repeat to select several categories.
    #[bpaf(long("category"), argument("NAME"), many)]
    pub categories: Vec<String>,

    /// Only list products in this price range, e.g. 'Under $50'
    ///
    /// Repeat to select several ranges.
    #[bpaf(long("price-range"), argument("LABEL"), many)]
    pub price_ranges: Vec<String>,

    /// Only list products whose title or description contains this text
    #[bpaf(long, short, argument("TEXT"), fallback(String::new()))]
    pub search: String,

    /// Sort by 'title', 'price' or 'category'
    #[bpaf(long("sort-by"), argument("KEY"), fallback(SortKey::Title))]
    pub sort_by: SortKey,

    /// Sort in descending order
    #[bpaf(long)]
    pub desc: bool,

    /// Page to show, starting at 1
    #[bpaf(long, argument("N"), fallback(NonZeroU32::MIN))]
    pub page: NonZeroU32,

    /// Products per page (default: 'page_size' from the config, or 10)
    #[bpaf(long, argument("N"), optional)]
    pub limit: Option<NonZeroU32>,

    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,
}

/// A listed product with the fields derived for display.
#[derive(Debug, Serialize)]
struct ListedProduct<'a> {
    #[serde(flatten)]
    product: &'a Product,
    stock_status: StockStatus,
    priority: Priority,
}

#[derive(Debug, Serialize)]
struct JsonPage<'a> {
    items: Vec<ListedProduct<'a>>,
    total: ProductCount,
    page: u32,
    total_pages: u64,
}

impl List {
    #[instrument(name = "list", skip_all, fields(search = %self.search, page = self.page.get()))]
    pub async fn handle(self, config: Config, client: &Client) -> Result<()> {
        print!("{}", self.run(&config, client).await?);
        Ok(())
    }

    /// Fetch the page and render what goes to stdout.
    ///
    /// Warnings and the empty page notice go to stderr.
    async fn run(&self, config: &Config, client: &Client) -> Result<String> {
        let query = self.query(config)?;
        let page = get_products(client, &query).await?;

        let total_pages = query.pagination.total_pages(page.total.get());
        if page.total.get() > 0 && u64::from(query.pagination.page.get()) > total_pages {
            message::warning(PageOutOfRange {
                page: query.pagination.page.get(),
                total_pages,
            });
        }

        if self.json {
            return Ok(format!("{}\n", render_json(&page, &query.pagination)?));
        }

        let mut out = String::new();
        if page.items.is_empty() {
            message::plain("No products found.");
        } else {
            out.push_str(&render_table(&page.items));
        }
        out.push_str(&render_footer(&query.pagination, page.total));
        out.push('\n');
        Ok(out)
    }

    fn query(&self, config: &Config) -> Result<Query> {
        let mut filters = Filters::new();
        for category in &self.categories {
            filters.select_category(category.as_str());
        }
        for label in &self.price_ranges {
            let Some(range) = price_range_preset(label) else {
                bail!(
                    "unknown price range '{label}', expected one of: {}",
                    PRICE_RANGE_PRESETS
                        .iter()
                        .map(|range| format!("'{}'", range.label))
                        .join(", ")
                );
            };
            filters.select_price_range(range.clone());
        }

        let sort_direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        Ok(Query {
            filters,
            search: self.search.clone(),
            sort_key: self.sort_by,
            sort_direction,
            pagination: Pagination {
                page: self.page,
                limit: self.limit.or(config.page_size).unwrap_or(DEFAULT_PAGE_SIZE),
            },
        })
    }
}

fn render_json(page: &ProductsPage, pagination: &Pagination) -> Result<String> {
    let json_page = JsonPage {
        items: page
            .items
            .iter()
            .map(|product| ListedProduct {
                product,
                stock_status: StockStatus::of(product),
                priority: Priority::of(product),
            })
            .collect(),
        total: page.total,
        page: pagination.page.get(),
        total_pages: pagination.total_pages(page.total.get()),
    };
    Ok(serde_json::to_string_pretty(&json_page)?)
}

/// Render products as an aligned table with a header row.
fn render_table(products: &[Product]) -> String {
    let header = ["TITLE", "CATEGORY", "STOCK", "PRICE", "PRIORITY"].map(String::from);
    let rows = products
        .iter()
        .map(|product| {
            [
                product.title.clone(),
                product.category.name.clone(),
                StockStatus::of(product).to_string(),
                format!("${:.2}", product.price),
                Priority::of(product).to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .join("  ");
            format!("{}\n", line.trim_end())
        })
        .collect()
}

fn render_footer(pagination: &Pagination, total: ProductCount) -> String {
    let total_pages = pagination.total_pages(total.get());
    match total {
        ProductCount::Exact(n) => format!(
            "Page {} of {total_pages} ({n} products)",
            pagination.page.get()
        ),
        ProductCount::Estimated(n) => format!(
            "Page {} of ~{total_pages} (~{n} products, estimated)",
            pagination.page.get()
        ),
    }
}

#[cfg(test)]
mod tests {
    use bpaf::Parser;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use storefront_catalog::types::test_helpers::{category, product};
    use storefront_sdk::providers::catalog::MockClient;

    use super::*;
    use crate::utils::message::history::History;

    fn list(args: &[&str]) -> List {
        super::list().to_options().run_inner(args).unwrap()
    }

    #[test]
    fn builds_query_from_flags() {
        let args = list(&[
            "--category",
            "Electronics",
            "--category",
            "Books",
            "--price-range",
            "Under $50",
            "--search",
            "lamp",
            "--sort-by",
            "price",
            "--desc",
            "--page",
            "2",
        ]);
        let query = args.query(&Config::default()).unwrap();

        assert_eq!(query.filters.categories(), ["Electronics", "Books"]);
        assert_eq!(query.filters.price_ranges()[0].max, Some(50.0));
        assert_eq!(query.search, "lamp");
        assert_eq!(query.sort_key, SortKey::Price);
        assert_eq!(query.sort_direction, SortDirection::Desc);
        assert_eq!(query.pagination.offset(), 10);
    }

    #[test]
    fn page_size_from_config_unless_given() {
        let config = Config {
            page_size: NonZeroU32::new(25),
            ..Default::default()
        };
        assert_eq!(list(&[]).query(&config).unwrap().pagination.limit.get(), 25);
        assert_eq!(
            list(&["--limit", "5"]).query(&config).unwrap().pagination.limit.get(),
            5
        );
        assert_eq!(
            list(&[]).query(&Config::default()).unwrap().pagination.limit,
            DEFAULT_PAGE_SIZE
        );
    }

    #[test]
    fn unknown_price_range_is_rejected() {
        let err = list(&["--price-range", "cheap"])
            .query(&Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("'Under $50'"), "{err}");
    }

    #[test]
    fn zero_page_is_rejected_by_parser() {
        assert!(super::list().to_options().run_inner(&["--page", "0"]).is_err());
    }

    #[test]
    fn renders_aligned_table() {
        let clothes = category(1, "Clothes");
        let products = vec![
            product(3, "Shirt", 20.0, &clothes),
            product(4, "Winter Jacket", 180.5, &clothes),
        ];
        assert_eq!(render_table(&products), indoc! {"
            TITLE          CATEGORY  STOCK      PRICE    PRIORITY
            Shirt          Clothes   In Stock   $20.00   Low
            Winter Jacket  Clothes   Low Stock  $180.50  Medium
        "});
    }

    #[test]
    fn footer_marks_estimates() {
        let pagination = Pagination::default();
        assert_eq!(
            render_footer(&pagination, ProductCount::Exact(23)),
            "Page 1 of 3 (23 products)"
        );
        assert_eq!(
            render_footer(&pagination, ProductCount::Estimated(30)),
            "Page 1 of ~3 (~30 products, estimated)"
        );
    }

    #[test]
    fn json_includes_derived_fields() {
        let clothes = category(1, "Clothes");
        let page = ProductsPage {
            items: vec![product(5, "Coat", 600.0, &clothes)],
            total: ProductCount::Exact(1),
        };
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&page, &Pagination::default()).unwrap()).unwrap();

        assert_eq!(json["items"][0]["title"], "Coat");
        assert_eq!(json["items"][0]["stock_status"], "out_of_stock");
        assert_eq!(json["items"][0]["priority"], "high");
        assert_eq!(json["total"], serde_json::json!({"kind": "exact", "value": 1}));
        assert_eq!(json["total_pages"], 1);
    }

    #[tokio::test]
    async fn lists_page_from_mock_catalog() {
        let clothes = category(1, "Clothes");
        let mut mock = MockClient::default();
        mock.push_products_response(vec![product(1, "Shirt", 20.0, &clothes)]);
        mock.push_products_response(vec![product(1, "Shirt", 20.0, &clothes)]);

        let client = Client::Mock(mock.clone());
        let out = list(&["--json"])
            .run(&Config::default(), &client)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["items"][0]["title"], "Shirt");
        assert_eq!(json["total"], serde_json::json!({"kind": "exact", "value": 1}));
        assert_eq!(mock.pending_responses(), 0);
    }

    #[tokio::test]
    async fn warns_when_page_is_beyond_last_page() {
        History::global().clear();
        let clothes = category(1, "Clothes");
        let mut mock = MockClient::default();
        mock.push_products_response(vec![]);
        mock.push_products_response(vec![
            product(1, "Shirt", 20.0, &clothes),
            product(2, "Coat", 600.0, &clothes),
        ]);

        let client = Client::Mock(mock);
        let out = list(&["--page", "3"])
            .run(&Config::default(), &client)
            .await
            .unwrap();

        assert_eq!(out, "Page 3 of 1 (2 products)\n");
        assert_eq!(&History::global().messages(), &[
            "WARNING: page 3 is out of range (1..=1)",
            "No products found.",
        ]);
    }

    #[tokio::test]
    async fn failed_recount_shows_estimated_footer() {
        History::global().clear();
        let clothes = category(1, "Clothes");
        let mut mock = MockClient::default();
        mock.push_products_response(vec![product(3, "Shirt", 20.0, &clothes)]);
        mock.push_error_response(500);

        let client = Client::Mock(mock);
        let out = list(&[]).run(&Config::default(), &client).await.unwrap();

        assert_eq!(out, indoc! {"
            TITLE  CATEGORY  STOCK     PRICE   PRIORITY
            Shirt  Clothes   In Stock  $20.00  Low
            Page 1 of ~1 (~10 products, estimated)
        "});
        assert!(History::global().messages().is_empty());
    }
}
