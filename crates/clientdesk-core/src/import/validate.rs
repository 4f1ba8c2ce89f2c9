//! Field-level checks for imported client rows.
//!
//! Each check returns the cleaned value or a human-readable reason. Callers
//! collect reasons per field; nothing here aborts a row.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::dates::parse_due_date;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_TAG_LEN: usize = 50;
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("Invalid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9(][0-9 .()\-]*[0-9]$").expect("Invalid phone regex")
    })
}

/// Trimmed, non-empty, bounded, no control characters.
///
/// # Errors
///
/// Returns the message shown in the row report.
pub fn validate_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("name must be <= {MAX_NAME_LEN} characters"));
    }
    if name.chars().any(char::is_control) {
        return Err("name must not contain control characters".to_string());
    }
    Ok(name.to_string())
}

/// # Errors
///
/// Returns the message shown in the row report.
pub fn validate_email(raw: &str) -> Result<String, String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err("email is required".to_string());
    }
    if !email_regex().is_match(email) {
        return Err(format!("'{email}' is not a valid email address"));
    }
    Ok(email.to_string())
}

/// Empty is allowed; otherwise digits with optional `+` and separators.
///
/// # Errors
///
/// Rejects other characters and digit counts out of range.
pub fn validate_phone(raw: &str) -> Result<Option<String>, String> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Ok(None);
    }
    if !phone_regex().is_match(phone) {
        return Err(format!("'{phone}' is not a valid phone number"));
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(format!(
            "phone must have {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits, got {digits}"
        ));
    }
    Ok(Some(phone.to_string()))
}

/// Empty is allowed; otherwise a date strictly before `today`.
///
/// # Errors
///
/// Rejects unparseable and non-past dates.
pub fn validate_birthday(raw: &str, today: NaiveDate) -> Result<Option<NaiveDate>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let date = parse_due_date(raw).map_err(|err| err.to_string())?;
    if date >= today {
        return Err(format!("birthday {date} must be in the past"));
    }
    Ok(Some(date))
}

/// # Errors
///
/// Rejects addresses over the length limit.
pub fn validate_address(raw: &str) -> Result<Option<String>, String> {
    let address = raw.trim();
    if address.is_empty() {
        return Ok(None);
    }
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(format!("address must be <= {MAX_ADDRESS_LEN} characters"));
    }
    Ok(Some(address.to_string()))
}

/// Split on `,` or `;`, dropping empty segments and repeats.
///
/// # Errors
///
/// Rejects an over-long tag or one with control characters.
pub fn parse_tags(raw: &str) -> Result<Vec<String>, String> {
    let mut seen = BTreeSet::new();
    let mut tags = Vec::new();
    for tag in raw.split([',', ';']).map(str::trim).filter(|t| !t.is_empty()) {
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(format!("tag '{tag}' must be <= {MAX_TAG_LEN} characters"));
        }
        if tag.chars().any(char::is_control) {
            return Err(format!("tag '{tag}' contains control characters"));
        }
        if seen.insert(tag.to_lowercase()) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
    }

    #[test]
    fn names() {
        assert_eq!(validate_name("  Dana Scully "), Ok("Dana Scully".to_string()));
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name("bad\u{7}name").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("dana@fbi.gov").is_ok());
        assert!(validate_email("d.s+work@mail.example.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("dana@fbi").is_err());
        assert!(validate_email("dana fbi@x.gov").is_err());
        assert!(validate_email("@fbi.gov").is_err());
        assert!(validate_email("dana@.gov").is_err());
    }

    #[test]
    fn phones() {
        assert_eq!(validate_phone(""), Ok(None));
        assert_eq!(
            validate_phone("+1 (555) 010-9999"),
            Ok(Some("+1 (555) 010-9999".to_string()))
        );
        assert!(validate_phone("555.0199").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn birthdays() {
        assert_eq!(validate_birthday("", today()), Ok(None));
        assert_eq!(
            validate_birthday("1990-04-01", today()),
            Ok(NaiveDate::from_ymd_opt(1990, 4, 1))
        );
        assert!(validate_birthday("2026-10-16", today()).is_err());
        assert!(validate_birthday("2030-01-01", today()).is_err());
        assert!(validate_birthday("04/01/1990", today()).is_err());
    }

    #[test]
    fn addresses() {
        assert_eq!(validate_address(" "), Ok(None));
        assert!(validate_address("1 Main St").is_ok());
        assert!(validate_address(&"x".repeat(MAX_ADDRESS_LEN + 1)).is_err());
    }

    #[test]
    fn tags_split_and_dedupe() {
        assert_eq!(
            parse_tags("vip; Lead,,vip , lead"),
            Ok(vec!["vip".to_string(), "Lead".to_string()])
        );
        assert_eq!(parse_tags(""), Ok(Vec::new()));
        assert!(parse_tags(&"t".repeat(MAX_TAG_LEN + 1)).is_err());
    }
}
