use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A catalog product as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: i64,
  pub created_at: DateTime<Utc>,
  pub title: String,
  pub description: String,
  pub image: String,
}

impl Product {
  /// Copy with surrounding whitespace removed from the text fields.
  pub fn trimmed(self) -> Self {
    Self {
      title: self.title.trim().to_string(),
      description: self.description.trim().to_string(),
      image: self.image.trim().to_string(),
      ..self
    }
  }
}

/// Trim every product's text fields.
pub fn trim_products(products: Vec<Product>) -> Vec<Product> {
  products.into_iter().map(Product::trimmed).collect()
}

/// Fields supplied when inserting a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub title: String,
  pub description: String,
  pub image: String,
}

impl NewProduct {
  pub fn new(title: &str, description: &str, image: &str) -> Self {
    Self {
      title: title.to_string(),
      description: description.to_string(),
      image: image.to_string(),
    }
  }
}

/// JSON wrapper used by every API response.
///
/// Successful responses carry `data`; failures carry `error` (a machine
/// readable code) and `message`. A missing `success` field reads as `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
  #[serde(default)]
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> Envelope<T> {
  pub fn ok(data: T, message: impl Into<String>) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
      message: Some(message.into()),
    }
  }

  pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
      message: Some(message.into()),
    }
  }
}

/// Products keyed by series label, serialized as a JSON object in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct SeriesMap(pub Vec<(&'static str, Vec<Product>)>);

impl SeriesMap {
  pub fn total_products(&self) -> usize {
    self.0.iter().map(|(_, products)| products.len()).sum()
  }

  pub fn total_categories(&self) -> usize {
    self.0.len()
  }
}

impl Serialize for SeriesMap {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(self.0.iter().map(|(series, products)| (*series, products)))
  }
}

/// Body of `GET /api/products/all`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllProducts {
  pub success: bool,
  pub data: SeriesMap,
  pub total_products: usize,
  pub total_categories: usize,
  pub message: String,
}

impl AllProducts {
  pub fn new(data: SeriesMap) -> Self {
    let total_products = data.total_products();
    let total_categories = data.total_categories();
    Self {
      success: true,
      data,
      total_products,
      total_categories,
      message: format!(
        "Successfully fetched {total_products} products across {total_categories} categories"
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn sample() -> Product {
    Product {
      id: 7,
      created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
      title: "  IFP62-75 Elite ".to_string(),
      description: "\tFast\n".to_string(),
      image: " https://example.com/a.jpg ".to_string(),
    }
  }

  #[test]
  fn test_product_uses_camel_case_fields() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["createdAt"], "2025-03-01T10:00:00Z");
    assert_eq!(json["id"], 7);
  }

  #[test]
  fn test_trimmed() {
    let p = sample().trimmed();
    assert_eq!(p.title, "IFP62-75 Elite");
    assert_eq!(p.description, "Fast");
    assert_eq!(p.image, "https://example.com/a.jpg");
    assert_eq!(p.id, 7);
  }

  #[test]
  fn test_failure_envelope_shape() {
    let json = serde_json::to_value(Envelope::<()>::failure("DatabaseError", "boom")).unwrap();
    assert_eq!(
      json,
      serde_json::json!({"success": false, "error": "DatabaseError", "message": "boom"})
    );
  }

  #[test]
  fn test_envelope_without_success_reads_as_failure() {
    let env: Envelope<Vec<Product>> = serde_json::from_str(r#"{"data": []}"#).unwrap();
    assert!(!env.success);
  }

  #[test]
  fn test_series_map_keeps_insertion_order() {
    let all = AllProducts::new(SeriesMap(vec![
      ("OPS Series", vec![sample()]),
      ("IFP50 Series", vec![]),
    ]));
    let text = serde_json::to_string(&all).unwrap();
    let ops = text.find("OPS Series").unwrap();
    let ifp = text.find("IFP50 Series").unwrap();
    assert!(ops < ifp);
    assert_eq!(all.total_products, 1);
    assert_eq!(all.total_categories, 2);
  }
}
