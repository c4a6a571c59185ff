//! Fields derived for display that the remote source does not provide.

use std::fmt::Display;

use serde::Serialize;

use crate::providers::catalog::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn of(product: &Product) -> Self {
        match product.id % 3 {
            0 => StockStatus::InStock,
            1 => StockStatus::LowStock,
            _ => StockStatus::OutOfStock,
        }
    }
}

impl Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn of(product: &Product) -> Self {
        if product.price > 500.0 {
            Priority::High
        } else if product.price > 100.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        write!(f, "{label}")
    }
}
