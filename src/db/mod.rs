pub mod schema;
pub mod seed;

use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

use crate::catalog::{Category, NewProduct, Product};

/// Product database connection
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create the database at `path`
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    let db = Self { conn };
    db.run_migrations()?;

    Ok(db)
  }

  /// Open a throwaway database that lives only as long as the connection
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;

    let db = Self { conn };
    db.run_migrations()?;

    Ok(db)
  }

  /// Get the default database path
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("heisko").join("catalog.db"))
  }

  /// Run database migrations
  fn run_migrations(&self) -> Result<()> {
    self
      .conn
      .execute_batch(schema::SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(())
  }

  /// Products of one category, newest first
  pub fn products_by_category(&self, category: Category) -> Result<Vec<Product>> {
    let mut stmt = self
      .conn
      .prepare(
        "SELECT id, title, description, image, created_at FROM products
         WHERE category = ?
         ORDER BY created_at DESC, id DESC",
      )
      .map_err(|e| eyre!("Failed to prepare product query: {}", e))?;

    let rows = stmt
      .query_map(params![category.slug()], read_row)
      .map_err(|e| eyre!("Failed to query {} products: {}", category, e))?;

    let mut products = Vec::new();
    for row in rows {
      let (id, title, description, image, created_at) =
        row.map_err(|e| eyre!("Failed to read product row: {}", e))?;
      products.push(Product {
        id,
        created_at: parse_datetime(&created_at)?,
        title,
        description,
        image,
      });
    }

    Ok(products)
  }

  /// Every category with its products, in catalogue order
  pub fn all_products(&self) -> Result<Vec<(Category, Vec<Product>)>> {
    Category::ALL
      .into_iter()
      .map(|category| Ok((category, self.products_by_category(category)?)))
      .collect()
  }

  /// Insert a product stamped with the current time
  pub fn insert_product(&self, category: Category, product: &NewProduct) -> Result<Product> {
    self.insert_product_at(category, product, Utc::now())
  }

  pub fn insert_product_at(
    &self,
    category: Category,
    product: &NewProduct,
    created_at: DateTime<Utc>,
  ) -> Result<Product> {
    self
      .conn
      .execute(
        "INSERT INTO products (category, title, description, image, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![
          category.slug(),
          product.title,
          product.description,
          product.image,
          format_datetime(created_at),
        ],
      )
      .map_err(|e| eyre!("Failed to insert {} product: {}", category, e))?;

    Ok(Product {
      id: self.conn.last_insert_rowid(),
      created_at,
      title: product.title.clone(),
      description: product.description.clone(),
      image: product.image.clone(),
    })
  }

  /// Total number of stored products
  pub fn count(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count products: {}", e))?;
    Ok(count as usize)
  }

  /// Remove every product
  pub fn clear(&self) -> Result<()> {
    self
      .conn
      .execute("DELETE FROM products", [])
      .map_err(|e| eyre!("Failed to clear products: {}", e))?;
    Ok(())
  }
}

type ProductRow = (i64, String, String, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
  Ok((
    row.get(0)?,
    row.get(1)?,
    row.get(2)?,
    row.get(3)?,
    row.get(4)?,
  ))
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_datetime(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn db() -> Database {
    Database::open_in_memory().unwrap()
  }

  #[test]
  fn test_products_are_newest_first() {
    let db = db();
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    db.insert_product_at(Category::Ifp62, &NewProduct::new("old", "d", "i"), base)
      .unwrap();
    db.insert_product_at(
      Category::Ifp62,
      &NewProduct::new("new", "d", "i"),
      base + Duration::days(1),
    )
    .unwrap();

    let products = db.products_by_category(Category::Ifp62).unwrap();
    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "old"]);
    assert_eq!(products[1].created_at, base);
  }

  #[test]
  fn test_categories_do_not_leak() {
    let db = db();
    db.insert_product(Category::Ops, &NewProduct::new("OPS i5", "d", "i"))
      .unwrap();

    assert!(db.products_by_category(Category::TvStand).unwrap().is_empty());
    assert_eq!(db.products_by_category(Category::Ops).unwrap().len(), 1);
  }

  #[test]
  fn test_all_products_covers_every_category() {
    let db = db();
    db.insert_product(Category::Rk3588, &NewProduct::new("RK3588", "d", "i"))
      .unwrap();

    let all = db.all_products().unwrap();
    assert_eq!(all.len(), Category::ALL.len());
    assert_eq!(all[0].0, Category::Ifp50);
    let rk = all.iter().find(|(c, _)| *c == Category::Rk3588).unwrap();
    assert_eq!(rk.1.len(), 1);
  }

  #[test]
  fn test_count_and_clear() {
    let db = db();
    db.insert_product(Category::Ops, &NewProduct::new("a", "d", "i"))
      .unwrap();
    db.insert_product(Category::Ops, &NewProduct::new("b", "d", "i"))
      .unwrap();
    assert_eq!(db.count().unwrap(), 2);
    db.clear().unwrap();
    assert_eq!(db.count().unwrap(), 0);
  }
}
