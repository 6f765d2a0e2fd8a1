use axum::{
  body::Bytes,
  extract::{Path, State},
  Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::catalog::product::trim_products;
use crate::catalog::{AllProducts, Category, Envelope, Product, SeriesMap};
use crate::config::MAIL_ENV_VARS;
use crate::contact::{ContactForm, MailError};

pub const LEAD_SENT_MESSAGE: &str = "Message sent successfully! Our team will contact you shortly.";

/// `GET /api/:group/:slug`
pub async fn category_handler(
  State(state): State<AppState>,
  Path((group, slug)): Path<(String, String)>,
) -> Result<Json<Envelope<Vec<Product>>>, ApiError> {
  let category = Category::from_api_segments(&group, &slug).map_err(|e| {
    warn!(%group, %slug, "Unknown category requested");
    ApiError::NotFound(e.to_string())
  })?;

  let products = state
    .with_db(move |db| db.products_by_category(category))
    .await
    .map_err(|e| {
      error!(category = %category, error = %e, "Failed to fetch products");
      ApiError::Database(category.series())
    })?;

  let products = trim_products(products);
  info!(category = %category, count = products.len(), "Fetched products");

  let message = format!(
    "Successfully fetched {} {} products",
    products.len(),
    category.series()
  );
  Ok(Json(Envelope::ok(products, message)))
}

/// `GET /api/products/all`
pub async fn all_products_handler(
  State(state): State<AppState>,
) -> Result<Json<AllProducts>, ApiError> {
  let grouped = state.with_db(|db| db.all_products()).await.map_err(|e| {
    error!(error = %e, "Failed to fetch all products");
    ApiError::AllProducts
  })?;

  let series = grouped
    .into_iter()
    .map(|(category, products)| (category.listing_key(), trim_products(products)))
    .collect();
  let body = AllProducts::new(SeriesMap(series));
  info!(
    products = body.total_products,
    categories = body.total_categories,
    "Fetched all products"
  );
  Ok(Json(body))
}

#[derive(Debug, Serialize)]
pub struct LeadReceipt {
  pub id: String,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
  pub success: bool,
  pub message: String,
  pub data: LeadReceipt,
}

/// `POST /api/contact`
pub async fn contact_handler(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
  let form: ContactForm =
    serde_json::from_slice(&body).map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
  let form = form.normalized();

  if let Err(errors) = form.validate() {
    info!(count = errors.len(), "Rejected contact form");
    return Err(ApiError::Validation(errors));
  }

  state.mailer.send_lead(&form).await?;

  let now = Utc::now();
  info!(name = %form.name, "Lead submitted");
  Ok(Json(ContactResponse {
    success: true,
    message: LEAD_SENT_MESSAGE.to_string(),
    data: LeadReceipt {
      id: format!("lead_{}", now.timestamp_millis()),
      timestamp: now,
    },
  }))
}

/// `GET /api/contact`
pub async fn contact_status_handler() -> Json<Value> {
  Json(json!({
    "success": true,
    "message": "Contact API is running",
    "timestamp": Utc::now(),
  }))
}

/// `GET /health`
pub async fn health_handler() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

/// Canned lead sent by the SMTP self-test.
pub fn smtp_test_lead() -> ContactForm {
  ContactForm {
    name: "SMTP Test User".to_string(),
    email: "test@example.com".to_string(),
    phone: "+61412345678".to_string(),
    message: "This is a test email to verify SMTP configuration is working correctly.".to_string(),
  }
}

/// `POST /api/test-smtp`
pub async fn smtp_test_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
  let missing = state.mailer.missing_settings();
  if !missing.is_empty() {
    warn!(?missing, "SMTP test requested without mail settings");
    return Err(ApiError::MissingSettings(missing));
  }

  match state.mailer.send_lead(&smtp_test_lead()).await {
    Ok(()) => {
      info!("SMTP test email sent");
      Ok(Json(json!({
        "success": true,
        "message": "SMTP test successful! Check your email for the test message.",
        "timestamp": Utc::now(),
      })))
    }
    Err(MailError::Smtp(e)) => {
      error!(error = %e, "SMTP test email was not delivered");
      Err(ApiError::SmtpTestSend)
    }
    Err(e) => {
      error!(error = %e, "SMTP test failed");
      Err(ApiError::SmtpTest(e.to_string()))
    }
  }
}

/// `GET /api/test-smtp`
pub async fn smtp_status_handler(State(state): State<AppState>) -> Json<Value> {
  let missing = state.mailer.missing_settings();
  let configured: Vec<&str> = MAIL_ENV_VARS
    .into_iter()
    .filter(|key| !missing.contains(key))
    .collect();
  let message = if missing.is_empty() {
    "SMTP configuration appears to be complete"
  } else {
    "SMTP configuration is incomplete"
  };

  Json(json!({
    "success": missing.is_empty(),
    "message": message,
    "configured": configured,
    "missing": missing,
    "timestamp": Utc::now(),
  }))
}
