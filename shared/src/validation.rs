use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum::{Display, EnumString};
use validator::{ValidationError, ValidationErrors};

use crate::constants::{INVALID_EMAIL_ERROR, INVALID_LOCAL_PHONE_ERROR, INVALID_PHONE_ERROR};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static INTERNATIONAL_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").unwrap());
static LOCAL_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^07\d{8}$").unwrap());

/// Which phone pattern the lead form accepts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PhoneFormat {
    /// Optional `+`, a nonzero digit, then up to 15 more digits.
    International,
    /// `07` followed by 8 digits, after every non-digit is stripped.
    Local,
}

/// A lead that passed validation, with fields normalised.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValidLead {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LeadRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(field_error("invalid_email_format", INVALID_EMAIL_ERROR));
    }
    Ok(())
}

/// Validates a phone number and returns it in the form that is forwarded.
pub fn validate_phone(phone: &str, format: PhoneFormat) -> Result<String, ValidationError> {
    match format {
        PhoneFormat::International => {
            let phone = phone.trim();
            if !INTERNATIONAL_PHONE_RE.is_match(phone) {
                return Err(field_error("invalid_phone_format", INVALID_PHONE_ERROR));
            }
            Ok(phone.to_string())
        }
        PhoneFormat::Local => {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            if !LOCAL_PHONE_RE.is_match(&digits) {
                return Err(field_error("invalid_local_phone_format", INVALID_LOCAL_PHONE_ERROR));
            }
            Ok(digits)
        }
    }
}

/// Validates both fields together so every failing field is reported.
pub fn validate_lead(request: &LeadRequest, format: PhoneFormat) -> Result<ValidLead, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_email(&request.email) {
        errors.add("email", e);
    }
    let phone = match validate_phone(&request.phone, format) {
        Ok(phone) => Some(phone),
        Err(e) => {
            errors.add("phone", e);
            None
        }
    };

    match phone {
        Some(phone) if errors.is_empty() => Ok(ValidLead {
            email: request.email.trim().to_string(),
            phone,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("  jane@example.co.uk ").is_ok());
        assert!(validate_email("jane@example").is_err());
        assert!(validate_email("jane example@mail.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_international_phone() {
        let check = |p: &str| validate_phone(p, PhoneFormat::International);
        assert_eq!(check("+447123456789"), Ok("+447123456789".to_string()));
        assert!(check("5").is_ok());
        assert!(check("0123456").is_err());
        assert!(check("+1234567890123456").is_ok());
        assert!(check("+12345678901234567").is_err());
        assert!(check("555-1234").is_err());
    }

    #[test]
    fn test_local_phone_strips_formatting() {
        let check = |p: &str| validate_phone(p, PhoneFormat::Local);
        assert_eq!(check("07123 456-78"), Ok("0712345678".to_string()));
        assert_eq!(check("(07) 1234 5678"), Ok("0712345678".to_string()));
        assert!(check("08123456789").is_err());
        assert!(check("071234567").is_err());
    }

    #[test]
    fn test_lead_reports_every_field() {
        let request = LeadRequest {
            email: "nope".to_string(),
            phone: "abc".to_string(),
        };
        let errors = validate_lead(&request, PhoneFormat::International).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
        assert_eq!(fields["email"][0].message.as_deref(), Some(INVALID_EMAIL_ERROR));
    }

    #[test]
    fn test_valid_lead_is_normalised() {
        let request = LeadRequest {
            email: " jane@example.com ".to_string(),
            phone: "07 1234 5678".to_string(),
        };
        let lead = validate_lead(&request, PhoneFormat::Local).unwrap();
        assert_eq!(
            lead,
            ValidLead {
                email: "jane@example.com".to_string(),
                phone: "0712345678".to_string(),
            }
        );
    }
}
