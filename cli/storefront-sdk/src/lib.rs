pub mod providers;
pub mod utils;

pub mod models;
