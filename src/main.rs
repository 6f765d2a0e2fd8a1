use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use heisko::catalog::series::{group_by_series, product_path};
use heisko::catalog::{Category, Product};
use heisko::client::cache_bust::{cache_busted_url, versioned_url};
use heisko::client::{CatalogClient, FetchPhase, ProductQuery};
use heisko::config::{missing_mail_vars, Config};
use heisko::contact::{LeadMailer, SmtpMailer, UnconfiguredMailer};
use heisko::db::{self, Database};
use heisko::logging;
use heisko::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "heisko")]
#[command(about = "Product catalog API and client for Heisko interactive displays")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/heisko/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the catalog and contact API
  Serve {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
  },

  /// Fetch product lists from a running catalog API
  Fetch(FetchArgs),

  /// Insert sample products into the catalog database
  Seed {
    /// Replace existing products
    #[arg(long)]
    force: bool,
  },
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
  /// Categories, e.g. ifp62 t982 ops
  #[arg(required = true)]
  categories: Vec<Category>,

  /// API base URL (overrides config)
  #[arg(long)]
  base_url: Option<String>,

  /// One request per category, without retries or the response cache
  #[arg(long, conflicts_with = "refresh")]
  once: bool,

  /// Fetch a second time, bypassing the response cache
  #[arg(long)]
  refresh: bool,

  /// Tag image URLs with this version instead of a timestamp
  #[arg(long)]
  image_version: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log)?;
  match &config.source {
    Some(path) => info!(path = %path.display(), "Loaded configuration"),
    None => info!("No configuration file found, using defaults"),
  }

  match args.command {
    Command::Serve { port } => serve(config, port).await,
    Command::Fetch(fetch_args) => fetch(config, fetch_args).await,
    Command::Seed { force } => {
      let db = open_database(&config)?;
      let inserted = db::seed::seed(&db, force)?;
      println!("Inserted {inserted} products ({} total)", db.count()?);
      Ok(())
    }
  }
}

fn open_database(config: &Config) -> Result<Database> {
  let path = match &config.database.path {
    Some(path) => path.clone(),
    None => Database::default_path()?,
  };
  info!(path = %path.display(), "Opening catalog database");
  Database::open(&path)
}

fn build_mailer(config: &Config) -> Arc<dyn LeadMailer> {
  let credentials = match Config::mail_credentials() {
    Ok(credentials) => credentials,
    Err(e) => {
      warn!("{e}; contact form submissions will be rejected");
      return Arc::new(UnconfiguredMailer::new(missing_mail_vars()));
    }
  };

  match SmtpMailer::new(&config.mail.smtp_host, &credentials) {
    Ok(mailer) => Arc::new(mailer),
    Err(e) => {
      warn!("Failed to set up SMTP mailer: {e}");
      Arc::new(UnconfiguredMailer::new(Vec::new()))
    }
  }
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
  let mut server_config = config.server.clone();
  if let Some(port) = port {
    server_config.port = port;
  }

  let db = open_database(&config)?;
  let state = AppState::new(db, build_mailer(&config));
  server::serve(&server_config, state).await
}

async fn fetch(config: Config, args: FetchArgs) -> Result<()> {
  let mut client_config = config.client.clone();
  if let Some(base_url) = &args.base_url {
    client_config.base_url = base_url.clone();
  }

  let client = CatalogClient::new(&client_config)?;

  let results: Vec<Result<Vec<Product>, String>> = if args.once {
    let client = &client;
    join_all(args.categories.iter().map(|category| async move {
      client
        .fetch_products(&category.api_path())
        .await
        .map_err(|e| e.user_message())
    }))
    .await
  } else {
    let mut queries: Vec<_> = args.categories.iter().map(|c| client.category(*c)).collect();
    drive(&mut queries).await;
    if args.refresh {
      for query in &mut queries {
        query.refetch();
      }
      drive(&mut queries).await;
    }

    let cache = client.cache();
    let purged = cache.purge_expired();
    debug!(
      entries = cache.len(),
      purged,
      capacity = cache.capacity(),
      ttl_secs = cache.ttl().as_secs(),
      "Response cache after fetch"
    );

    queries
      .iter()
      .map(|q| match q.error() {
        Some(error) => Err(error.to_string()),
        None => Ok(q.data().to_vec()),
      })
      .collect()
  };

  let mut failed = 0;
  for (category, result) in args.categories.iter().zip(results) {
    let products = match result {
      Ok(products) => products,
      Err(error) => {
        println!("{}: {}", category.series(), error);
        failed += 1;
        continue;
      }
    };

    println!(
      "{} - {} products ({})",
      category.series(),
      products.len(),
      category.page_path()
    );
    for (series, products) in group_by_series(products) {
      println!("  {series}");
      for product in products {
        println!("    {}  {}", product.title, product_path(&product.title));
        if !product.image.is_empty() {
          let image = match &args.image_version {
            Some(version) => versioned_url(&product.image, version),
            None => cache_busted_url(&product.image),
          };
          println!("      {image}");
        }
      }
    }
  }

  if failed > 0 {
    return Err(eyre!("{} of {} categories failed", failed, args.categories.len()));
  }
  Ok(())
}

/// Poll queries until none is loading, reporting scheduled retries.
async fn drive(queries: &mut [ProductQuery<Product>]) {
  let mut ticker = tokio::time::interval(Duration::from_millis(50));

  while queries.iter().any(|q| q.is_loading()) {
    ticker.tick().await;
    for query in queries.iter_mut() {
      if query.poll() {
        if let FetchPhase::Retrying { attempt, delay } = query.phase() {
          eprintln!(
            "{}: retry {} in {} ms",
            query.url(),
            attempt,
            delay.as_millis()
          );
        }
      }
    }
  }
}
