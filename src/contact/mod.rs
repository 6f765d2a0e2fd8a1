//! Contact form handling: validation and lead email delivery.

pub mod form;
pub mod mailer;

pub use form::ContactForm;
pub use mailer::{LeadMailer, MailError, SmtpMailer, UnconfiguredMailer};
