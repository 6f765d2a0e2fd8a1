use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::QueryOptions;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub server: ServerConfig,
  pub database: DatabaseConfig,
  pub client: ClientConfig,
  pub mail: MailConfig,
  pub log: LogConfig,
  /// File the configuration was read from, `None` for built-in defaults
  #[serde(skip)]
  pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: "0.0.0.0".to_string(),
      port: 3000,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  /// SQLite file (defaults to $XDG_DATA_HOME/heisko/catalog.db)
  pub path: Option<PathBuf>,
}

/// Settings for the catalog client used by `heisko fetch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub base_url: String,
  pub retry_count: u32,
  pub retry_delay_ms: u64,
  pub cache_time_secs: u64,
  /// Maximum number of cached responses
  pub cache_capacity: usize,
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:3000".to_string(),
      retry_count: 3,
      retry_delay_ms: 1000,
      cache_time_secs: 5 * 60,
      cache_capacity: 64,
      timeout_secs: 10,
    }
  }
}

impl ClientConfig {
  pub fn query_options(&self) -> QueryOptions {
    QueryOptions::default()
      .with_retry_count(self.retry_count)
      .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
      .with_cache_time(Duration::from_secs(self.cache_time_secs))
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
  pub smtp_host: String,
}

impl Default for MailConfig {
  fn default() -> Self {
    Self {
      smtp_host: "smtp.gmail.com".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter used when RUST_LOG is not set
  pub level: String,
  /// Write daily-rotated log files here in addition to stdout
  pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      directory: None,
    }
  }
}

/// Environment variables the SMTP mailer cannot do without.
pub const MAIL_ENV_VARS: [&str; 2] = ["GMAIL_USER", "GMAIL_APP_PASSWORD"];

/// SMTP login and lead recipient, read from the environment.
#[derive(Clone)]
pub struct MailCredentials {
  pub user: String,
  pub password: String,
  pub recipient: String,
}

impl std::fmt::Debug for MailCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MailCredentials")
      .field("user", &self.user)
      .field("recipient", &self.recipient)
      .finish_non_exhaustive()
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./heisko.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/heisko/config.yaml
  ///
  /// Without any file the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("heisko.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("heisko").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config = Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(Self {
      source: Some(path.to_path_buf()),
      ..config
    })
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Get the SMTP credentials from environment variables.
  ///
  /// Requires GMAIL_USER and GMAIL_APP_PASSWORD. Leads go to
  /// LEAD_RECIPIENT_EMAIL, or back to GMAIL_USER when unset.
  pub fn mail_credentials() -> Result<MailCredentials> {
    let user = non_empty_var("GMAIL_USER");
    let password = non_empty_var("GMAIL_APP_PASSWORD");

    match (user, password) {
      (Some(user), Some(password)) => {
        let recipient = non_empty_var("LEAD_RECIPIENT_EMAIL").unwrap_or_else(|| user.clone());
        Ok(MailCredentials {
          user,
          password,
          recipient,
        })
      }
      _ => Err(eyre!(
        "Missing required Gmail environment variables (GMAIL_USER, GMAIL_APP_PASSWORD)"
      )),
    }
  }
}

/// Required mail variables that are unset or blank.
pub fn missing_mail_vars() -> Vec<&'static str> {
  MAIL_ENV_VARS
    .into_iter()
    .filter(|key| non_empty_var(key).is_none())
    .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}
