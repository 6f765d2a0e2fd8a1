use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};

use crate::contact::LeadMailer;
use crate::db::Database;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
  db: Arc<Mutex<Database>>,
  pub mailer: Arc<dyn LeadMailer>,
}

impl AppState {
  pub fn new(db: Database, mailer: Arc<dyn LeadMailer>) -> Self {
    Self {
      db: Arc::new(Mutex::new(db)),
      mailer,
    }
  }

  /// Run a blocking database call off the async runtime.
  pub async fn with_db<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&Database) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let db = Arc::clone(&self.db);
    tokio::task::spawn_blocking(move || {
      let db = db.lock().map_err(|_| eyre!("Database lock poisoned"))?;
      f(&db)
    })
    .await
    .map_err(|e| eyre!("Database task failed: {}", e))?
  }
}
