//! Configuration types for catalog client construction.

use std::collections::BTreeMap;

/// Public instance of the remote catalog the CLI talks to unless configured
/// otherwise.
pub const DEFAULT_API_URL: &str = "https://api.escuelajs.co/api/v1";

/// Configuration for catalog client construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogClientConfig {
    /// Base URL of the remote source, e.g. `https://host/api/v1`.
    ///
    /// Endpoint paths (`/products`, `/categories`) are appended to it.
    pub api_url: String,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Overrides the default `User-Agent` header.
    pub user_agent: Option<String>,
}

impl CatalogClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            extra_headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
