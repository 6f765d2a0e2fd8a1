//! Lead email delivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info};

use super::form::ContactForm;
use crate::config::{MailCredentials, MAIL_ENV_VARS};

#[derive(Debug, Error)]
pub enum MailError {
  #[error("Email service is not configured")]
  NotConfigured,

  #[error("Invalid mailbox address: {0}")]
  Address(#[from] lettre::address::AddressError),

  #[error("Failed to build email: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("SMTP error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivers contact-form leads to the sales inbox.
#[async_trait]
pub trait LeadMailer: Send + Sync {
  async fn send_lead(&self, form: &ContactForm) -> Result<(), MailError>;

  /// Environment variables this mailer still needs before it can send.
  fn missing_settings(&self) -> Vec<&'static str> {
    Vec::new()
  }
}

/// Stand-in used when SMTP credentials are missing; every send fails.
#[derive(Debug, Clone)]
pub struct UnconfiguredMailer {
  missing: Vec<&'static str>,
}

impl UnconfiguredMailer {
  pub fn new(missing: Vec<&'static str>) -> Self {
    Self { missing }
  }
}

impl Default for UnconfiguredMailer {
  fn default() -> Self {
    Self::new(MAIL_ENV_VARS.to_vec())
  }
}

#[async_trait]
impl LeadMailer for UnconfiguredMailer {
  async fn send_lead(&self, _form: &ContactForm) -> Result<(), MailError> {
    Err(MailError::NotConfigured)
  }

  fn missing_settings(&self) -> Vec<&'static str> {
    self.missing.clone()
  }
}

/// SMTP relay mailer (Gmail with an app password by default).
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from: Mailbox,
  to: Mailbox,
}

impl SmtpMailer {
  pub fn new(smtp_host: &str, credentials: &MailCredentials) -> Result<Self, MailError> {
    let from: Mailbox = credentials.user.parse()?;
    let to: Mailbox = credentials.recipient.parse()?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?
      .credentials(Credentials::new(
        credentials.user.clone(),
        credentials.password.clone(),
      ))
      .build();

    debug!(host = smtp_host, "SMTP transport ready");
    Ok(Self {
      transport,
      from,
      to,
    })
  }
}

#[async_trait]
impl LeadMailer for SmtpMailer {
  async fn send_lead(&self, form: &ContactForm) -> Result<(), MailError> {
    let message = Message::builder()
      .from(self.from.clone())
      .to(self.to.clone())
      .subject(lead_subject(form))
      .header(ContentType::TEXT_HTML)
      .body(render_lead_email(form, Utc::now()))?;

    self.transport.send(message).await?;
    info!(recipient = %self.to, "Lead email sent");
    Ok(())
  }
}

pub fn lead_subject(form: &ContactForm) -> String {
  format!("New Lead from Heisko Website - {}", form.name)
}

/// HTML body of the lead email. User input is escaped.
pub fn render_lead_email(form: &ContactForm, submitted_at: DateTime<Utc>) -> String {
  let name = escape_html(&form.name);
  let email = escape_html(&form.email);
  let phone = escape_html(&form.phone);
  let message = escape_html(&form.message).replace('\n', "<br>");
  let timestamp = submitted_at.format("%Y-%m-%d %H:%M:%S UTC");

  format!(
    r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #dc2626; text-align: center;">New Lead from Heisko Website</h2>
  <div style="background-color: #f3f4f6; padding: 20px; border-radius: 8px;">
    <h3>Contact Information</h3>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
    <p><strong>Phone:</strong> <a href="tel:{phone}">{phone}</a></p>
  </div>
  <div style="background-color: #fef2f2; padding: 20px; border-left: 4px solid #dc2626;">
    <h3>Message</h3>
    <p style="line-height: 1.6;">{message}</p>
  </div>
  <p style="color: #6b7280; font-size: 14px;">This lead was submitted from the Heisko website contact form.</p>
  <p style="color: #6b7280; font-size: 14px;">Timestamp: {timestamp}</p>
</div>"#
  )
}

fn escape_html(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}
