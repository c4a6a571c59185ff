//! Shared HTTP client infrastructure for the remote product catalog.
//!
//! This crate provides:
//! - HTTP client construction with default headers and timeouts
//! - Common error handling for catalog API operations
//! - The wire types (`Product`, `Category`) and the query parameters the
//!   remote source understands
//!
//! Query reconciliation (multi-category filters, price range widening,
//! local sorting and recounting) lives in `storefront-sdk`; this crate only
//! speaks the remote source's own, narrower, protocol.
//!
//! ## Usage
//!
//! ```ignore
//! use storefront_catalog::{CatalogClient, CatalogClientConfig, DEFAULT_API_URL, ProductParams};
//!
//! let client = CatalogClient::new(CatalogClientConfig::new(DEFAULT_API_URL))?;
//! let page = client.products(&ProductParams::page(10, 0)).await?;
//! ```

mod client;
mod config;
mod error;
pub mod types;

pub use client::CatalogClient;
pub use reqwest::StatusCode;
pub use config::{CatalogClientConfig, DEFAULT_API_URL};
pub use error::CatalogClientError;
pub use types::{Category, Product, ProductParams};
