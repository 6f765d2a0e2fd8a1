//! Catalog client: cache-busted requests, a shared response cache and
//! retrying product queries.

pub mod api;
pub mod cache;
pub mod cache_bust;
pub mod query;
pub mod source;

pub use api::CatalogClient;
pub use cache::ResponseCache;
pub use query::{FetchPhase, FetchState, ProductQuery, QueryOptions};
pub use source::{FetchError, HttpSource, ProductSource};
