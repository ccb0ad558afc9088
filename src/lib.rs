pub mod api;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod stock;
pub mod upstream;

pub use cache::StockCache;
pub use config::Config;
pub use metrics::Metrics;
pub use stock::{normalize, StockReport};
