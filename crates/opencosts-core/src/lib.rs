#[cfg(feature = "network")]
pub mod api;
pub mod catalog;
pub mod config;
pub mod csv;
pub mod error;
pub mod model;
#[cfg(feature = "network")]
pub mod openrouter;
pub mod pricing;
pub mod provider;

pub use catalog::{Catalog, DataSource};
pub use error::CatalogError;
pub use model::{Author, Model};
pub use pricing::{AveragePrices, PriceRatios};
pub use provider::Provider;
