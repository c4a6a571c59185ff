//! Catalog wire types.
//!
//! These mirror the JSON documents of the remote source. Fields the client
//! does not use are ignored on deserialization; optional metadata defaults
//! when absent.

use serde::{Deserialize, Serialize};

/// A product category, embedded by value in every [Product].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Query parameters of `GET /products`.
///
/// The remote source filters by at most one category and a single price
/// interval, and does not sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductParams {
    pub limit: u32,
    pub offset: u64,
    pub title: Option<String>,
    pub category_id: Option<u64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl ProductParams {
    /// Parameters for an unfiltered page.
    pub fn page(limit: u32, offset: u64) -> Self {
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }

    /// Render as `(name, value)` pairs in the order the remote source
    /// documents them.
    ///
    /// Prices use `Display` so integral values are sent without a
    /// fractional part (`10000`, not `10000.0`).
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        if let Some(price_min) = self.price_min {
            pairs.push(("price_min", price_min.to_string()));
        }
        if let Some(price_max) = self.price_max {
            pairs.push(("price_max", price_max.to_string()));
        }
        pairs
    }
}

#[cfg(any(test, feature = "tests"))]
pub mod test_helpers {
    use super::*;

    pub fn category(id: u64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            image: format!("https://i.imgur.com/category-{id}.jpeg"),
            creation_at: None,
            updated_at: None,
        }
    }

    pub fn product(id: u64, title: &str, price: f64, category: &Category) -> Product {
        Product {
            id,
            title: title.to_string(),
            price,
            slug: title.to_lowercase().replace(' ', "-"),
            description: String::new(),
            category: category.clone(),
            images: vec![format!("https://i.imgur.com/product-{id}.jpeg")],
            creation_at: None,
            updated_at: None,
        }
    }
}
