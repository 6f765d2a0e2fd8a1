//! Product query with retry, backoff and a shared response cache.
//!
//! A `ProductQuery<T>` owns the request lifecycle for one URL. It checks
//! the [`ResponseCache`] first, then fetches through a [`ProductSource`],
//! retrying failures with exponential backoff:
//!
//! ```text
//! Idle -> Fetching -> Success
//!             |
//!             +-> Retrying -> Fetching ...
//!             |
//!             +-> Failed   (after retry_count retries)
//! ```
//!
//! Attempts run sequentially on a single background task. The task is
//! aborted when the query is dropped, refetched or pointed at a new URL,
//! so a stale cycle can never write into the state afterwards.
//!
//! # Example
//!
//! ```ignore
//! let mut query = ProductQuery::new("/api/ifpd/t982", source, cache, QueryOptions::default());
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! let state = query.state();
//! if state.loading { render_spinner() }
//! else if let Some(e) = &state.error { render_retry(e) }
//! else { render(&state.data) }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::cache::ResponseCache;
use super::source::ProductSource;

/// Retry and caching knobs for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
  /// Retries after the first failed attempt
  pub retry_count: u32,
  /// Base backoff, doubled after every retry
  pub retry_delay: Duration,
  /// How long a cached response stays fresh
  pub cache_time: Duration,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      retry_count: 3,
      retry_delay: Duration::from_millis(1000),
      cache_time: Duration::from_secs(5 * 60),
    }
  }
}

impl QueryOptions {
  pub fn with_retry_count(mut self, retry_count: u32) -> Self {
    self.retry_count = retry_count;
    self
  }

  pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
    self.retry_delay = retry_delay;
    self
  }

  pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
    self.cache_time = cache_time;
    self
  }

  /// Delay before retry number `attempt + 1`: `retry_delay * 2^attempt`.
  pub fn backoff(&self, attempt: u32) -> Duration {
    self
      .retry_delay
      .saturating_mul(2u32.saturating_pow(attempt))
  }
}

/// What the rendering layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T> {
  pub data: Vec<T>,
  pub loading: bool,
  pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
  fn default() -> Self {
    Self {
      data: Vec::new(),
      loading: true,
      error: None,
    }
  }
}

/// Where a query is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
  Idle,
  /// Attempt `attempt` is in flight (0 is the first try)
  Fetching { attempt: u32 },
  /// Waiting `delay` before attempt `attempt`
  Retrying { attempt: u32, delay: Duration },
  Success,
  Failed,
}

impl FetchPhase {
  pub fn is_active(&self) -> bool {
    matches!(
      self,
      FetchPhase::Fetching { .. } | FetchPhase::Retrying { .. }
    )
  }
}

/// Progress reported by the background cycle.
#[derive(Debug)]
enum Progress<T> {
  Attempt(u32),
  Retrying { attempt: u32, delay: Duration },
  Succeeded(Vec<T>),
  Failed(String),
}

/// Aborts the wrapped task when dropped.
struct CycleGuard(JoinHandle<()>);

impl Drop for CycleGuard {
  fn drop(&mut self) {
    self.0.abort();
  }
}

/// Fetch-with-retry-and-cache controller for one product list.
pub struct ProductQuery<T> {
  url: String,
  source: Arc<dyn ProductSource<T>>,
  cache: ResponseCache<T>,
  options: QueryOptions,
  state: FetchState<T>,
  phase: FetchPhase,
  receiver: Option<mpsc::UnboundedReceiver<Progress<T>>>,
  cycle: Option<CycleGuard>,
}

impl<T> ProductQuery<T>
where
  T: Clone + Send + Sync + 'static,
{
  pub fn new(
    url: impl Into<String>,
    source: Arc<dyn ProductSource<T>>,
    cache: ResponseCache<T>,
    options: QueryOptions,
  ) -> Self {
    Self {
      url: url.into(),
      source,
      cache,
      options,
      state: FetchState::default(),
      phase: FetchPhase::Idle,
      receiver: None,
      cycle: None,
    }
  }

  /// Create the query and immediately start fetching.
  pub fn mount(
    url: impl Into<String>,
    source: Arc<dyn ProductSource<T>>,
    cache: ResponseCache<T>,
    options: QueryOptions,
  ) -> Self {
    let mut query = Self::new(url, source, cache, options);
    query.fetch();
    query
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn options(&self) -> &QueryOptions {
    &self.options
  }

  pub fn state(&self) -> &FetchState<T> {
    &self.state
  }

  pub fn phase(&self) -> FetchPhase {
    self.phase
  }

  pub fn data(&self) -> &[T] {
    &self.state.data
  }

  pub fn is_loading(&self) -> bool {
    self.state.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error.as_deref()
  }

  /// Start a fetch cycle unless one is already running.
  pub fn fetch(&mut self) {
    if self.phase.is_active() {
      return;
    }
    self.start_cycle();
  }

  /// Drop the cached entry and fetch again over the network, cancelling
  /// any cycle in progress.
  pub fn refetch(&mut self) {
    self.cache.evict(&self.url);
    self.cancel();
    self.start_cycle();
  }

  /// `refetch` and wait for the outcome.
  pub async fn refresh(&mut self) -> &FetchState<T> {
    self.refetch();
    self.settle().await
  }

  /// Point the query at another URL and fetch it.
  pub fn set_url(&mut self, url: impl Into<String>) {
    let url = url.into();
    if url == self.url && self.phase != FetchPhase::Idle {
      return;
    }
    self.url = url;
    self.cancel();
    self.start_cycle();
  }

  /// Abort the running cycle, if any. State keeps its last values.
  pub fn cancel(&mut self) {
    self.receiver = None;
    self.cycle = None;
    if self.phase.is_active() {
      self.phase = FetchPhase::Idle;
      self.state.loading = false;
    }
  }

  /// Apply pending progress without blocking.
  ///
  /// Returns `true` if the state changed. Call this from the event loop.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    loop {
      let receiver = match &mut self.receiver {
        Some(rx) => rx,
        None => return changed,
      };

      match receiver.try_recv() {
        Ok(progress) => {
          self.apply(progress);
          changed = true;
        }
        Err(mpsc::error::TryRecvError::Empty) => return changed,
        Err(mpsc::error::TryRecvError::Disconnected) => {
          self.apply(Progress::Failed("Query was cancelled".to_string()));
          return true;
        }
      }
    }
  }

  /// Wait until the current cycle succeeds or fails.
  pub async fn settle(&mut self) -> &FetchState<T> {
    while let Some(receiver) = self.receiver.as_mut() {
      let progress = receiver.recv().await;
      match progress {
        Some(progress) => self.apply(progress),
        None => self.apply(Progress::Failed("Query was cancelled".to_string())),
      }
    }
    &self.state
  }

  fn start_cycle(&mut self) {
    self.state.loading = true;
    self.state.error = None;

    if let Some(data) = self.cache.get_within(&self.url, self.options.cache_time) {
      debug!(url = %self.url, count = data.len(), "Serving products from cache");
      self.state.data = data;
      self.state.loading = false;
      self.phase = FetchPhase::Success;
      return;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_cycle(
      self.url.clone(),
      Arc::clone(&self.source),
      self.cache.clone(),
      self.options,
      tx,
    ));

    self.receiver = Some(rx);
    self.cycle = Some(CycleGuard(handle));
    self.phase = FetchPhase::Fetching { attempt: 0 };
  }

  fn apply(&mut self, progress: Progress<T>) {
    match progress {
      Progress::Attempt(attempt) => {
        self.phase = FetchPhase::Fetching { attempt };
      }
      Progress::Retrying { attempt, delay } => {
        self.phase = FetchPhase::Retrying { attempt, delay };
      }
      Progress::Succeeded(data) => {
        self.state.data = data;
        self.state.error = None;
        self.state.loading = false;
        self.phase = FetchPhase::Success;
        self.finish();
      }
      Progress::Failed(message) => {
        self.state.error = Some(message);
        self.state.loading = false;
        self.phase = FetchPhase::Failed;
        self.finish();
      }
    }
  }

  fn finish(&mut self) {
    self.receiver = None;
    self.cycle = None;
  }
}

impl<T> std::fmt::Debug for ProductQuery<T>
where
  T: std::fmt::Debug,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProductQuery")
      .field("url", &self.url)
      .field("state", &self.state)
      .field("phase", &self.phase)
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

/// One fetch cycle: the first attempt plus up to `retry_count` retries.
async fn run_cycle<T>(
  url: String,
  source: Arc<dyn ProductSource<T>>,
  cache: ResponseCache<T>,
  options: QueryOptions,
  tx: mpsc::UnboundedSender<Progress<T>>,
) where
  T: Clone + Send + Sync + 'static,
{
  let mut attempt = 0;

  loop {
    if attempt == 0 {
      info!(url = %url, "Fetching products");
    } else {
      info!(url = %url, attempt, "Retrying products fetch");
    }
    // Ignore send errors - receiver may have been dropped
    let _ = tx.send(Progress::Attempt(attempt));

    match source.fetch(&url).await {
      Ok(data) => {
        info!(url = %url, count = data.len(), "Fetched products");
        cache.insert(&url, data.clone());
        let _ = tx.send(Progress::Succeeded(data));
        return;
      }
      Err(err) => {
        let message = err.user_message();
        error!(url = %url, error = %err, "Products fetch failed");

        if attempt >= options.retry_count {
          let _ = tx.send(Progress::Failed(message));
          return;
        }

        let delay = options.backoff(attempt);
        attempt += 1;
        warn!(
          url = %url,
          delay_ms = delay.as_millis() as u64,
          "Retrying (attempt {}/{})",
          attempt,
          options.retry_count
        );
        let _ = tx.send(Progress::Retrying { attempt, delay });
        tokio::time::sleep(delay).await;
      }
    }
  }
}
