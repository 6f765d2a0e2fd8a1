//! Catalog HTTP API.

pub mod error;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::{
  http::{
    header::{CACHE_CONTROL, CONTENT_TYPE},
    HeaderValue, Method,
  },
  routing::get,
  Router,
};
use color_eyre::{eyre::eyre, Result};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

pub use error::ApiError;
pub use state::AppState;

use crate::config::ServerConfig;
use handlers::{
  all_products_handler, category_handler, contact_handler, contact_status_handler, health_handler,
  smtp_status_handler, smtp_test_handler,
};

/// Build the API router.
pub fn router(state: AppState) -> Router {
  let cors = CorsLayer::new()
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([CONTENT_TYPE])
    .max_age(Duration::from_secs(60 * 60));

  Router::new()
    .route("/api/products/all", get(all_products_handler))
    .route("/api/contact", get(contact_status_handler).post(contact_handler))
    .route("/api/test-smtp", get(smtp_status_handler).post(smtp_test_handler))
    .route("/api/:group/:slug", get(category_handler))
    .route("/health", get(health_handler))
    .layer(SetResponseHeaderLayer::overriding(
      CACHE_CONTROL,
      HeaderValue::from_static("no-store, must-revalidate"),
    ))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
  let address = config.address();
  info!("Binding to {address}");

  let listener = TcpListener::bind(&address)
    .await
    .map_err(|e| eyre!("Failed to bind {}: {}", address, e))?;
  info!("Server running on {address}");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| eyre!("Server error: {}", e))?;

  info!("Server shut down");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    match ctrl_c().await {
      Ok(()) => info!("Received Ctrl+C, shutting down"),
      Err(e) => {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
        info!("Received terminate signal, shutting down");
      }
      Err(e) => {
        error!("Failed to install signal handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Category, NewProduct};
  use crate::contact::{ContactForm, LeadMailer, MailError, UnconfiguredMailer};
  use crate::db::Database;
  use async_trait::async_trait;
  use axum::body::Body;
  use axum::http::{Request, StatusCode};
  use chrono::{TimeZone, Utc};
  use serde_json::Value;
  use std::sync::{Arc, Mutex};
  use tower::ServiceExt;

  #[derive(Default)]
  struct RecordingMailer {
    sent: Mutex<Vec<ContactForm>>,
  }

  #[async_trait]
  impl LeadMailer for RecordingMailer {
    async fn send_lead(&self, form: &ContactForm) -> Result<(), MailError> {
      self.sent.lock().unwrap().push(form.clone());
      Ok(())
    }
  }

  struct BrokenMailer;

  #[async_trait]
  impl LeadMailer for BrokenMailer {
    async fn send_lead(&self, _form: &ContactForm) -> Result<(), MailError> {
      let err = "not a mailbox"
        .parse::<lettre::message::Mailbox>()
        .unwrap_err();
      Err(MailError::Address(err))
    }
  }

  fn catalog() -> Database {
    let db = Database::open_in_memory().unwrap();
    let older = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let newer = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    db.insert_product_at(
      Category::T982,
      &NewProduct::new("T982 65 inch", "Older", "/img/a.png"),
      older,
    )
    .unwrap();
    db.insert_product_at(
      Category::T982,
      &NewProduct::new(" T982 75 inch ", " Newer ", "/img/b.png"),
      newer,
    )
    .unwrap();
    db
  }

  fn app_with(mailer: Arc<dyn LeadMailer>) -> Router {
    router(AppState::new(catalog(), mailer))
  }

  fn app() -> Router {
    app_with(Arc::new(UnconfiguredMailer::default()))
  }

  async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
      .oneshot(Request::get(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    read_json(response).await
  }

  async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
      .oneshot(
        Request::post(uri)
          .header(CONTENT_TYPE, "application/json")
          .body(Body::from(body.to_string()))
          .unwrap(),
      )
      .await
      .unwrap();
    read_json(response).await
  }

  async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  const VALID_LEAD: &str = r#"{
    "name": "  Priya  ",
    "email": "priya@example.com",
    "phone": "+61 2 9876 5432",
    "message": "Please send a quote for ten panels."
  }"#;

  #[tokio::test]
  async fn test_category_newest_first_and_trimmed() {
    let (status, body) = get_json(app(), "/api/ifpd/t982").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["title"], "T982 75 inch");
    assert_eq!(body["data"][0]["description"], "Newer");
    assert_eq!(body["data"][1]["title"], "T982 65 inch");
    assert_eq!(
      body["message"],
      "Successfully fetched 2 T982 Professional Series products"
    );
  }

  #[tokio::test]
  async fn test_responses_are_not_cacheable() {
    let response = app()
      .oneshot(Request::get("/api/ifpd/t982").body(Body::empty()).unwrap())
      .await
      .unwrap();
    let cache_control = response.headers().get(CACHE_CONTROL).unwrap();
    assert!(cache_control.to_str().unwrap().contains("no-store"));
  }

  #[tokio::test]
  async fn test_empty_category() {
    let (status, body) = get_json(app(), "/api/interactive-display/ifp50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn test_unknown_category_is_not_found() {
    let (status, body) = get_json(app(), "/api/ifpd/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "NotFound");
  }

  #[tokio::test]
  async fn test_category_under_wrong_group_is_not_found() {
    let (status, _) = get_json(app(), "/api/interactive-display/t982").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_all_products() {
    let (status, body) = get_json(app(), "/api/products/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProducts"], 2);
    assert_eq!(body["totalCategories"], Category::ALL.len());
    assert_eq!(
      body["data"]["T982 Series"]
        .as_array()
        .unwrap()
        .len(),
      2
    );
    assert_eq!(
      body["message"],
      "Successfully fetched 2 products across 20 categories"
    );
  }

  #[tokio::test]
  async fn test_contact_success_sends_normalized_lead() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = post_json(app_with(mailer.clone()), "/api/contact", VALID_LEAD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], handlers::LEAD_SENT_MESSAGE);
    assert!(body["data"]["id"].as_str().unwrap().starts_with("lead_"));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, "Priya");
  }

  #[tokio::test]
  async fn test_contact_validation_error() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = post_json(
      app_with(mailer.clone()),
      "/api/contact",
      r#"{"name": "P", "email": "bad", "phone": "+61 2 9876 5432", "message": "Hello there, world"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(
      body["message"],
      "Name must be at least 2 characters long, Please enter a valid email address"
    );
    assert!(mailer.sent.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_contact_malformed_body() {
    let (status, body) = post_json(app(), "/api/contact", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn test_contact_without_mail_configuration() {
    let (status, body) = post_json(app(), "/api/contact", VALID_LEAD).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "CONFIGURATION_ERROR");
  }

  #[tokio::test]
  async fn test_contact_send_failure() {
    let (status, body) = post_json(app_with(Arc::new(BrokenMailer)), "/api/contact", VALID_LEAD).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "EMAIL_SEND_FAILED");
    assert_eq!(body["message"], "Failed to send email. Please try again later.");
  }

  #[tokio::test]
  async fn test_smtp_self_test_sends_canned_lead() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = post_json(app_with(mailer.clone()), "/api/test-smtp", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().starts_with("SMTP test successful"));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, "SMTP Test User");
    assert_eq!(sent[0].validate(), Ok(()));
  }

  #[tokio::test]
  async fn test_smtp_self_test_without_settings() {
    let (status, body) = post_json(app(), "/api/test-smtp", "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "MISSING_ENV_VARS");
    assert_eq!(
      body["message"],
      "Missing environment variables: GMAIL_USER, GMAIL_APP_PASSWORD"
    );
  }

  #[tokio::test]
  async fn test_smtp_self_test_reports_mailer_failure() {
    let (status, body) = post_json(app_with(Arc::new(BrokenMailer)), "/api/test-smtp", "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "TEST_FAILED");
    assert!(body["message"]
      .as_str()
      .unwrap()
      .starts_with("Invalid mailbox address"));
  }

  #[tokio::test]
  async fn test_smtp_status_lists_settings() {
    let (_, body) = get_json(app(), "/api/test-smtp").await;
    assert_eq!(body["success"], false);
    assert_eq!(body["missing"].as_array().unwrap().len(), 2);
    assert_eq!(body["configured"].as_array().unwrap().len(), 0);

    let (_, body) = get_json(app_with(Arc::new(RecordingMailer::default())), "/api/test-smtp").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "SMTP configuration appears to be complete");
    assert_eq!(body["configured"], serde_json::json!(["GMAIL_USER", "GMAIL_APP_PASSWORD"]));
  }

  #[tokio::test]
  async fn test_contact_status() {
    let (status, body) = get_json(app(), "/api/contact").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact API is running");
    assert!(body["timestamp"].is_string());
  }

  #[tokio::test]
  async fn test_health() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }
}
