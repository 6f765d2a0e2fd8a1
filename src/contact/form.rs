use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[1-9][0-9]{0,15}$";

fn email_regex() -> Option<&'static Regex> {
  static RE: OnceLock<Option<Regex>> = OnceLock::new();
  RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

fn phone_regex() -> Option<&'static Regex> {
  static RE: OnceLock<Option<Regex>> = OnceLock::new();
  RE.get_or_init(|| Regex::new(PHONE_PATTERN).ok()).as_ref()
}

/// A lead submitted through the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub message: String,
}

impl ContactForm {
  /// Copy with surrounding whitespace removed from every field.
  pub fn normalized(&self) -> Self {
    Self {
      name: self.name.trim().to_string(),
      email: self.email.trim().to_string(),
      phone: self.phone.trim().to_string(),
      message: self.message.trim().to_string(),
    }
  }

  /// Check every field, collecting all problems in form order.
  ///
  /// Expects a normalized form.
  pub fn validate(&self) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if self.name.is_empty() {
      errors.push("Name is required".to_string());
    } else if self.name.chars().count() < 2 {
      errors.push("Name must be at least 2 characters long".to_string());
    }

    if self.email.is_empty() {
      errors.push("Email is required".to_string());
    } else if !is_valid_email(&self.email) {
      errors.push("Please enter a valid email address".to_string());
    }

    if self.phone.is_empty() {
      errors.push("Phone number is required".to_string());
    } else if !is_valid_phone(&self.phone) {
      errors.push("Please enter a valid phone number".to_string());
    }

    if self.message.is_empty() {
      errors.push("Message is required".to_string());
    } else if self.message.chars().count() < 10 {
      errors.push("Message must be at least 10 characters long".to_string());
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors)
    }
  }
}

pub fn is_valid_email(email: &str) -> bool {
  email_regex().is_some_and(|re| re.is_match(email))
}

/// Phone numbers may contain spaces, dashes and parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
  let digits: String = phone
    .chars()
    .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
    .collect();
  phone_regex().is_some_and(|re| re.is_match(&digits))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(name: &str, email: &str, phone: &str, message: &str) -> ContactForm {
    ContactForm {
      name: name.to_string(),
      email: email.to_string(),
      phone: phone.to_string(),
      message: message.to_string(),
    }
  }

  #[test]
  fn test_valid_form() {
    let f = form("Jo", "jo@example.com", "+61 (2) 9876-5432", "Need a quote please");
    assert_eq!(f.validate(), Ok(()));
  }

  #[test]
  fn test_empty_form_reports_every_field() {
    let errors = ContactForm::default().validate().unwrap_err();
    assert_eq!(
      errors,
      vec![
        "Name is required",
        "Email is required",
        "Phone number is required",
        "Message is required",
      ]
    );
  }

  #[test]
  fn test_length_rules() {
    let errors = form("J", "jo@example.com", "0298765432", "short")
      .validate()
      .unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].contains("Name must be at least 2"));
    assert!(errors[1].contains("valid phone"));
    assert!(errors[2].contains("Message must be at least 10"));
  }

  #[test]
  fn test_email_rules() {
    assert!(is_valid_email("a@b.co"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("a b@c.com"));
    assert!(!is_valid_email("@c.com"));
  }

  #[test]
  fn test_phone_rules() {
    assert!(is_valid_phone("+1 (555) 123-4567"));
    assert!(is_valid_phone("61298765432"));
    assert!(!is_valid_phone("0412345678"));
    assert!(!is_valid_phone("+12345678901234567"));
    assert!(!is_valid_phone("call me"));
  }

  #[test]
  fn test_normalized_trims_and_deserializes_missing_fields() {
    let f: ContactForm = serde_json::from_str(r#"{"name": "  Sam  "}"#).unwrap();
    let f = f.normalized();
    assert_eq!(f.name, "Sam");
    assert_eq!(f.email, "");
  }
}
