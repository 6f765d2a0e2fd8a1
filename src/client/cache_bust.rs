//! URL helpers that defeat browser, CDN and HTTP caches.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA};

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

/// Append `key=value` using `?` or `&` depending on whether the URL
/// already has a query string. Empty URLs are returned unchanged.
fn append_param(url: &str, key: &str, value: &str) -> String {
  if url.is_empty() {
    return String::new();
  }
  let separator = if url.contains('?') { '&' } else { '?' };
  format!("{url}{separator}{key}={value}")
}

/// Asset URL with a `v=<now>` buster.
pub fn cache_busted_url(url: &str) -> String {
  cache_busted_url_at(url, now_millis())
}

pub fn cache_busted_url_at(url: &str, millis: i64) -> String {
  append_param(url, "v", &millis.to_string())
}

/// API URL with a `t=<now>` buster.
pub fn cache_busted_api_url(url: &str) -> String {
  cache_busted_api_url_at(url, now_millis())
}

pub fn cache_busted_api_url_at(url: &str, millis: i64) -> String {
  append_param(url, "t", &millis.to_string())
}

/// URL pinned to a release, e.g. `versioned_url(img, "latest")`.
pub fn versioned_url(url: &str, version: &str) -> String {
  append_param(url, "version", version)
}

/// Headers sent with every product query.
pub fn query_headers() -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
  headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
  headers
}

/// Headers asking every cache on the path not to store or reuse a response.
pub fn no_cache_headers() -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(
    CACHE_CONTROL,
    HeaderValue::from_static("no-cache, no-store, must-revalidate"),
  );
  headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
  headers.insert(EXPIRES, HeaderValue::from_static("0"));
  headers
}
