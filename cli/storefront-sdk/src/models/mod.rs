pub mod collation;
pub mod presentation;
pub mod products;
pub mod query;
pub mod sequence;
pub mod snapshot;
