use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::error;

use crate::catalog::Envelope;
use crate::contact::MailError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("Failed to fetch {0} data from database")]
  Database(&'static str),

  #[error("Failed to fetch products from database")]
  AllProducts,

  #[error("{}", .0.join(", "))]
  Validation(Vec<String>),

  #[error("Malformed payload: {0}")]
  MalformedPayload(String),

  #[error("Email service is not properly configured. Please contact support.")]
  MailNotConfigured,

  #[error("Failed to send email. Please try again later.")]
  MailFailed,

  #[error("Missing environment variables: {}", .0.join(", "))]
  MissingSettings(Vec<&'static str>),

  #[error("Failed to send test email. Check your SMTP configuration.")]
  SmtpTestSend,

  #[error("{0}")]
  SmtpTest(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Validation(_) | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
      ApiError::Database(_)
      | ApiError::AllProducts
      | ApiError::MailNotConfigured
      | ApiError::MailFailed
      | ApiError::MissingSettings(_)
      | ApiError::SmtpTestSend
      | ApiError::SmtpTest(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Machine readable code carried in the envelope's `error` field.
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::NotFound(_) => "NotFound",
      ApiError::Database(_) | ApiError::AllProducts => "DatabaseError",
      ApiError::Validation(_) => "VALIDATION_ERROR",
      ApiError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
      ApiError::MailNotConfigured => "CONFIGURATION_ERROR",
      ApiError::MailFailed | ApiError::SmtpTestSend => "EMAIL_SEND_FAILED",
      ApiError::MissingSettings(_) => "MISSING_ENV_VARS",
      ApiError::SmtpTest(_) => "TEST_FAILED",
    }
  }
}

impl From<MailError> for ApiError {
  fn from(err: MailError) -> Self {
    match err {
      MailError::NotConfigured => {
        error!("Lead received but SMTP credentials are not configured");
        ApiError::MailNotConfigured
      }
      other => {
        error!(error = %other, "Failed to send lead email");
        ApiError::MailFailed
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = Envelope::<()>::failure(self.code(), self.to_string());
    (self.status(), Json(body)).into_response()
  }
}
