//! Shared in-memory response cache keyed by request URL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// A cached response body.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  pub data: Vec<T>,
  pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
  fn is_fresh(&self, ttl: Duration) -> bool {
    self.stored_at.elapsed() < ttl
  }
}

/// Process-wide response cache.
///
/// Clones share the same entries, so every query handed the same cache
/// sees the others' results. Entries expire after `ttl`; at most
/// `capacity` entries are held and the oldest one is evicted first.
pub struct ResponseCache<T> {
  entries: Arc<Mutex<HashMap<String, CacheEntry<T>>>>,
  ttl: Duration,
  capacity: usize,
}

impl<T: Clone> ResponseCache<T> {
  pub fn new(ttl: Duration, capacity: usize) -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
      ttl,
      capacity: capacity.max(1),
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
    // Entries stay consistent even if a holder panicked
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Fresh data for `url`. Expired entries are dropped and read as a miss.
  pub fn get(&self, url: &str) -> Option<Vec<T>> {
    self.get_within(url, self.ttl)
  }

  /// Like [`get`](Self::get), but also treats entries older than `max_age`
  /// as a miss. Such entries are kept for callers with a longer window.
  pub fn get_within(&self, url: &str, max_age: Duration) -> Option<Vec<T>> {
    let mut entries = self.lock();
    let entry = entries.get(url)?;

    if entry.is_fresh(max_age.min(self.ttl)) {
      return Some(entry.data.clone());
    }
    if !entry.is_fresh(self.ttl) {
      entries.remove(url);
    }
    None
  }

  /// Store data for `url`, replacing any previous entry.
  pub fn insert(&self, url: &str, data: Vec<T>) {
    let mut entries = self.lock();

    if !entries.contains_key(url) && entries.len() >= self.capacity {
      let ttl = self.ttl;
      entries.retain(|_, entry| entry.is_fresh(ttl));

      if entries.len() >= self.capacity {
        let oldest = entries
          .iter()
          .min_by_key(|(_, entry)| entry.stored_at)
          .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
          entries.remove(&key);
        }
      }
    }

    entries.insert(
      url.to_string(),
      CacheEntry {
        data,
        stored_at: Instant::now(),
      },
    );
  }

  /// Forget `url`. Returns whether an entry was present.
  pub fn evict(&self, url: &str) -> bool {
    self.lock().remove(url).is_some()
  }

  /// Drop every expired entry. Returns how many were removed.
  pub fn purge_expired(&self) -> usize {
    let ttl = self.ttl;
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|_, entry| entry.is_fresh(ttl));
    before - entries.len()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<T> Clone for ResponseCache<T> {
  fn clone(&self) -> Self {
    Self {
      entries: Arc::clone(&self.entries),
      ttl: self.ttl,
      capacity: self.capacity,
    }
  }
}
