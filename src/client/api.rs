//! High-level client for the catalog API.

use std::sync::Arc;
use std::time::Duration;

use super::cache::ResponseCache;
use super::query::{ProductQuery, QueryOptions};
use super::source::{FetchError, HttpSource, ProductSource};
use crate::catalog::product::trim_products;
use crate::catalog::{Category, Product};
use crate::config::ClientConfig;

/// Hands out product queries that share one source and one cache.
#[derive(Clone)]
pub struct CatalogClient {
  source: Arc<dyn ProductSource<Product>>,
  cache: ResponseCache<Product>,
  options: QueryOptions,
}

impl CatalogClient {
  pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
    let source = HttpSource::new(config)?;
    let cache = ResponseCache::new(
      Duration::from_secs(config.cache_time_secs),
      config.cache_capacity,
    );
    Ok(Self::from_parts(Arc::new(source), cache, config.query_options()))
  }

  pub fn from_parts(
    source: Arc<dyn ProductSource<Product>>,
    cache: ResponseCache<Product>,
    options: QueryOptions,
  ) -> Self {
    Self {
      source,
      cache,
      options,
    }
  }

  pub fn cache(&self) -> &ResponseCache<Product> {
    &self.cache
  }

  pub fn options(&self) -> &QueryOptions {
    &self.options
  }

  /// A started query for any API path.
  pub fn query(&self, path: impl Into<String>) -> ProductQuery<Product> {
    ProductQuery::mount(
      path,
      Arc::clone(&self.source),
      self.cache.clone(),
      self.options,
    )
  }

  /// A started query for one category's product list.
  pub fn category(&self, category: Category) -> ProductQuery<Product> {
    self.query(category.api_path())
  }

  /// One request, no retries and no cache. Text fields come back trimmed.
  pub async fn fetch_products(&self, path: &str) -> Result<Vec<Product>, FetchError> {
    self.source.fetch(path).await.map(trim_products)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::NewProduct;
  use crate::contact::mailer::UnconfiguredMailer;
  use crate::db::Database;
  use crate::server::{router, AppState};
  use url::Url;

  async fn spawn_server() -> Url {
    let db = Database::open_in_memory().unwrap();
    db.insert_product(
      Category::Ifp62,
      &NewProduct::new("  IFP62 86 inch  ", "Panel", "/img/ifp62.png"),
    )
    .unwrap();

    let state = AppState::new(db, Arc::new(UnconfiguredMailer::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router(state)).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/")).unwrap()
  }

  fn client_for(base: Url) -> CatalogClient {
    client_with_cache(base, ResponseCache::new(Duration::from_secs(300), 16))
  }

  fn client_with_cache(base: Url, cache: ResponseCache<Product>) -> CatalogClient {
    let source = HttpSource::with_client(reqwest::Client::new(), Some(base));
    CatalogClient::from_parts(
      Arc::new(source),
      cache,
      QueryOptions::default().with_retry_count(0),
    )
  }

  #[tokio::test]
  async fn test_category_query_against_server() {
    let client = client_for(spawn_server().await);

    let mut query = client.category(Category::Ifp62);
    let state = query.settle().await;
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.data.len(), 1);
    assert_eq!(state.data[0].title, "IFP62 86 inch");

    assert_eq!(client.cache().len(), 1);
  }

  #[tokio::test]
  async fn test_unknown_path_reports_server_message() {
    let client = client_for(spawn_server().await);

    let err = client.fetch_products("/api/ifpd/nope").await.unwrap_err();
    assert!(matches!(err, FetchError::Server { status: 404, .. }));
    assert!(err.user_message().contains("nope"));
  }

  #[tokio::test]
  async fn test_empty_category_is_success() {
    let client = client_for(spawn_server().await);

    let products = client
      .fetch_products(&Category::T982.api_path())
      .await
      .unwrap();
    assert!(products.is_empty());
  }

  #[tokio::test]
  async fn test_single_fetch_leaves_cache_alone() {
    let client = client_for(spawn_server().await);

    let products = client
      .fetch_products(&Category::Ifp62.api_path())
      .await
      .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "IFP62 86 inch");
    assert!(client.cache().is_empty());
    assert_eq!(client.options().retry_count, 0);
  }

  #[tokio::test]
  async fn test_purge_after_queries_settle() {
    let base = spawn_server().await;
    let client = client_with_cache(base, ResponseCache::new(Duration::ZERO, 16));

    let mut queries = vec![client.category(Category::Ifp62), client.category(Category::Ops)];
    for query in &mut queries {
      assert!(query.settle().await.error.is_none());
    }

    let cache = client.cache();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.purge_expired(), 2);
    assert!(cache.is_empty());
  }
}
