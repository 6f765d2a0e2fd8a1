//! Transport seam between queries and the catalog API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::cache_bust::{cache_busted_api_url, query_headers};
use crate::catalog::Envelope;
use crate::config::ClientConfig;

/// Message shown when nothing better is known about a failure.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch data";

/// Message shown for bodies that are not a usable envelope.
pub const MALFORMED_RESPONSE: &str = "Invalid response format";

/// Why a product list could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The API answered with a failure envelope
  #[error("{error}: {message}")]
  Server {
    status: u16,
    error: String,
    message: String,
  },

  /// Body was not a success envelope carrying data
  #[error("Invalid response format: {0}")]
  Malformed(String),

  /// Non-success status without a readable envelope
  #[error("Request failed with status code {0}")]
  Status(u16),

  #[error("{0}")]
  Transport(#[from] reqwest::Error),

  #[error("Invalid URL: {0}")]
  Url(#[from] url::ParseError),
}

impl FetchError {
  /// Text suitable for display: the server's own message if it sent one,
  /// otherwise the transport error, otherwise a generic message.
  pub fn user_message(&self) -> String {
    let message = match self {
      FetchError::Server { message, .. } => message.clone(),
      FetchError::Malformed(_) => MALFORMED_RESPONSE.to_string(),
      other => other.to_string(),
    };
    if message.trim().is_empty() {
      GENERIC_FETCH_ERROR.to_string()
    } else {
      message
    }
  }
}

/// Something that can produce the product list behind a URL.
#[async_trait]
pub trait ProductSource<T>: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<Vec<T>, FetchError>;
}

/// Decode a response body into its data, whatever the status code.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Vec<T>, FetchError> {
  let ok_status = (200..300).contains(&status);

  match serde_json::from_slice::<Envelope<Vec<T>>>(body) {
    Ok(envelope) if envelope.success => envelope
      .data
      .ok_or_else(|| FetchError::Malformed("success without data".to_string())),
    Ok(Envelope {
      message: Some(message),
      error,
      ..
    }) => Err(FetchError::Server {
      status,
      error: error.unwrap_or_default(),
      message,
    }),
    _ if !ok_status => Err(FetchError::Status(status)),
    Ok(_) => Err(FetchError::Malformed("success flag not set".to_string())),
    Err(e) => Err(FetchError::Malformed(e.to_string())),
  }
}

/// reqwest-backed source talking to the catalog API.
#[derive(Clone)]
pub struct HttpSource {
  client: reqwest::Client,
  base_url: Option<Url>,
}

impl HttpSource {
  /// Create a configured HTTP source.
  pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("heisko/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    let base_url = Url::parse(&config.base_url)?;

    Ok(Self::with_client(client, Some(base_url)))
  }

  pub fn with_client(client: reqwest::Client, base_url: Option<Url>) -> Self {
    Self { client, base_url }
  }

  /// Resolve a path such as `/api/ifpd/t982` against the base URL.
  pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
    let resolved = match &self.base_url {
      Some(base) => base.join(url)?,
      None => Url::parse(url)?,
    };
    Ok(resolved)
  }
}

#[async_trait]
impl<T> ProductSource<T> for HttpSource
where
  T: DeserializeOwned + Send + 'static,
{
  async fn fetch(&self, url: &str) -> Result<Vec<T>, FetchError> {
    let target = cache_busted_api_url(self.resolve(url)?.as_str());

    let response = self
      .client
      .get(target)
      .headers(query_headers())
      .send()
      .await?;

    let status = response.status().as_u16();
    let body = response.bytes().await?;
    decode_envelope(status, &body)
  }
}
