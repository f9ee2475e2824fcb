use crate::domain::error::ValidationError;
use crate::domain::lead::LeadForm;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

pub const DOMESTIC_COUNTRY_CODE: &str = "+91";
pub const MIN_FORM_DWELL: Duration = Duration::from_millis(2000);

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s'-]+$").expect("static regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));
static DOMESTIC_MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("static regex"));

pub fn validate_name(value: &str) -> bool {
    value.chars().count() >= 2 && NAME_RE.is_match(value)
}

pub fn validate_email(value: &str) -> bool {
    if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    EMAIL_RE.is_match(value)
}

pub fn validate_phone_number(national_number: &str, country_code: &str) -> bool {
    let digits = digits_only(national_number);
    if country_code.trim() == DOMESTIC_COUNTRY_CODE {
        DOMESTIC_MOBILE_RE.is_match(&digits)
    } else {
        (10..=15).contains(&digits.len())
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn validate_lead(form: &LeadForm) -> Result<(), ValidationError> {
    if !validate_name(&form.first_name) {
        return Err(ValidationError::FirstName);
    }
    if !validate_name(&form.last_name) {
        return Err(ValidationError::LastName);
    }
    if !validate_email(&form.email) {
        return Err(ValidationError::Email);
    }
    if !validate_phone_number(&form.phone_number, &form.country_code) {
        return Err(if form.country_code.trim() == DOMESTIC_COUNTRY_CODE {
            ValidationError::DomesticPhone
        } else {
            ValidationError::Phone
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    shown_at: Instant,
    min_dwell: Duration,
}

impl SubmissionGuard {
    pub fn new(shown_at: Instant) -> Self {
        Self {
            shown_at,
            min_dwell: MIN_FORM_DWELL,
        }
    }

    pub fn form_shown(&mut self, at: Instant) {
        self.shown_at = at;
    }

    pub fn check(&self, submitted_at: Instant) -> Result<(), ValidationError> {
        if submitted_at.saturating_duration_since(self.shown_at) < self.min_dwell {
            return Err(ValidationError::SubmittedTooFast);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> LeadForm {
        LeadForm {
            first_name: "Asha".to_string(),
            last_name: "D'Souza-Rao".to_string(),
            email: "asha@example.com".to_string(),
            country_code: "+91".to_string(),
            phone_number: "98765 43210".to_string(),
        }
    }

    #[test]
    fn names() {
        assert!(validate_name("Al"));
        assert!(validate_name("Mary Ann"));
        assert!(validate_name("O'Neil-Smith"));
        assert!(!validate_name("A"));
        assert!(!validate_name("R2D2"));
        assert!(!validate_name(""));
    }

    #[test]
    fn emails() {
        assert!(validate_email("a@b.com"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email(""));
        assert!(!validate_email("   "));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a@b.com "));
    }

    #[test]
    fn foreign_numbers_need_ten_to_fifteen_digits() {
        assert!(validate_phone_number("415-555-0100", "+1"));
        assert!(!validate_phone_number("555-0100", "+1"));
        assert!(!validate_phone_number("1234567890123456", "+44"));
        assert!(!validate_phone_number("", "+44"));
    }

    #[test]
    fn lead_passes_and_reports_first_failure() {
        assert_eq!(validate_lead(&form()), Ok(()));

        let mut bad = form();
        bad.last_name = "X".to_string();
        bad.email = "nope".to_string();
        assert_eq!(validate_lead(&bad), Err(ValidationError::LastName));

        let mut bad_phone = form();
        bad_phone.phone_number = "5876543210".to_string();
        assert_eq!(validate_lead(&bad_phone), Err(ValidationError::DomesticPhone));

        bad_phone.country_code = "+44".to_string();
        bad_phone.phone_number = "12345".to_string();
        assert_eq!(validate_lead(&bad_phone), Err(ValidationError::Phone));
    }

    #[test]
    fn guard_requires_two_seconds_and_resets() {
        let t0 = Instant::now();
        let mut guard = SubmissionGuard::new(t0);
        assert_eq!(
            guard.check(t0 + Duration::from_millis(1999)),
            Err(ValidationError::SubmittedTooFast)
        );
        assert!(guard.check(t0 + Duration::from_millis(2000)).is_ok());

        guard.form_shown(t0 + Duration::from_secs(10));
        assert!(guard.check(t0 + Duration::from_secs(11)).is_err());
        assert!(guard.check(t0 + Duration::from_secs(12)).is_ok());
    }
}
