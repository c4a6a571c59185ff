//! Catalog client for the remote product/category REST API.

use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::types::{Category, Product, ProductParams};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A client for the remote catalog.
///
/// This is a thin wrapper around a [reqwest::Client] that handles:
/// - HTTP client configuration with timeouts and default headers
/// - Endpoint URL construction relative to the configured base URL
/// - Mapping of transport, status and decoding failures
///   into [CatalogClientError]
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_url", &self.config.api_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        // fail early on a malformed base url rather than on the first request
        Url::parse(&config.api_url).map_err(|source| CatalogClientError::InvalidUrl {
            url: config.api_url.clone(),
            source,
        })?;

        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// `GET /products` with filter and pagination parameters.
    #[instrument(skip_all, fields(limit = params.limit, offset = params.offset))]
    pub async fn products(&self, params: &ProductParams) -> Result<Vec<Product>, CatalogClientError> {
        let products: Vec<Product> = self.get_json("products", &params.query_pairs()).await?;
        debug!(n_products = products.len(), "received product page");
        Ok(products)
    }

    /// `GET /products` without parameters, i.e. the complete collection.
    #[instrument(skip_all)]
    pub async fn all_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        let products: Vec<Product> = self.get_json("products", &[]).await?;
        debug!(n_products = products.len(), "received full product collection");
        Ok(products)
    }

    /// `GET /products/{id}`.
    ///
    /// Unknown ids are reported as [CatalogClientError::NotFound].
    /// The public API answers those with `400` rather than `404`,
    /// so both are treated as "not found".
    #[instrument(skip(self))]
    pub async fn product(&self, id: u64) -> Result<Product, CatalogClientError> {
        self.get_json(&format!("products/{id}"), &[])
            .await
            .map_err(|err| match err.status() {
                Some(StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) => {
                    CatalogClientError::NotFound(id)
                },
                _ => err,
            })
    }

    /// `GET /categories`, in the order returned by the remote source.
    #[instrument(skip_all)]
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogClientError> {
        let categories: Vec<Category> = self.get_json("categories", &[]).await?;
        debug!(n_categories = categories.len(), "received categories");
        Ok(categories)
    }

    /// Resolve `path` against the base url.
    ///
    /// [Url::join] would drop the last path segment of a base url without a
    /// trailing slash (`/api/v1` + `products` = `/api/products`),
    /// so the path is appended textually.
    fn endpoint(&self, path: &str) -> Result<Url, CatalogClientError> {
        let raw = format!("{}/{}", self.config.api_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|source| CatalogClientError::InvalidUrl { url: raw, source })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogClientError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let url_str = url.to_string();
        debug!(url = %url_str, "sending catalog request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CatalogClientError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url_str, %status, "catalog request failed");
            return Err(CatalogClientError::Status {
                url: url_str,
                status,
            });
        }

        // Read the body first so that malformed documents are reported as
        // decoding errors rather than transport errors.
        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogClientError::Transport {
                url: url_str.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| CatalogClientError::Decode {
            url: url_str,
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        api_url = %config.api_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("storefront/{}", env!("CARGO_PKG_VERSION")));

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent)
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}
