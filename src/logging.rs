//! Tracing setup shared by all subcommands.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Output always goes to stdout;
/// when a log directory is configured it is also written to a daily-rotated
/// file. Keep the returned guard alive so buffered lines are flushed on exit.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

  let (file_layer, guard) = match &config.directory {
    Some(directory) => {
      let appender = tracing_appender::rolling::daily(directory, "heisko.log");
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer().with_writer(writer).with_ansi(false);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer())
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_directory_adds_file_output() {
    let directory = std::env::temp_dir().join(format!("heisko-logs-{}", std::process::id()));
    let config = LogConfig {
      level: "info".to_string(),
      directory: Some(directory.clone()),
    };

    let guard = init(&config).unwrap();
    assert!(guard.is_some());
    tracing::info!("catalog log line");
    drop(guard);

    let written = std::fs::read_dir(&directory)
      .unwrap()
      .filter_map(|entry| entry.ok())
      .any(|entry| {
        std::fs::read_to_string(entry.path()).is_ok_and(|text| text.contains("catalog log line"))
      });
    std::fs::remove_dir_all(&directory).unwrap();
    assert!(written);
  }
}
