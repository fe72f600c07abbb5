use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use regex::Regex;

use super::email::{is_valid_email, normalize_email};
use super::sanitize::clean_text;
use super::IntakeError;

pub const FIRST_NAME_MSG: &str = "First name is required and must be a non-empty string";
pub const LAST_NAME_MSG: &str = "Last name is required and must be a non-empty string";
pub const EMAIL_MSG: &str = "Valid email address is required";
pub const PHONE_MSG: &str = "Valid phone number is required";
pub const ADDRESS_MSG: &str = "Street address is required";
pub const POSTAL_CODE_MSG: &str = "Postal code is required";
pub const BUSINESS_IDEA_MSG: &str = "Business idea must be at least 5 characters long";
pub const REQUIREMENTS_MSG: &str = "Detailed requirements must be at least 10 characters long";

pub(crate) const BUSINESS_IDEA_MIN: usize = 5;
pub(crate) const REQUIREMENTS_MIN: usize = 10;

/// Phone numbers are stored in a VARCHAR(20) column.
const PHONE_MAX_LEN: usize = 20;
const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // a `+` must be followed by country digits; separators only sit between digits
        Regex::new(concat!(
            r"^(?:(?:\+[0-9]{1,4}|[0-9]{1,4})[ .\-]?)?",
            r"(?:\([0-9]{1,5}\)[ .\-]?)?[0-9]+(?:[ .\-][0-9]+)*$",
        ))
        .expect("phone pattern compiles")
    })
}

/// A submission that passed validation. Text is trimmed and escaped, and the
/// email is in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub business_idea: String,
    pub requirements: String,
}

/// Check a raw form payload.
///
/// Every rule is evaluated, so the error list names each problem with the
/// payload rather than just the first. A value that is not a JSON string
/// counts as missing.
pub fn validate_submission(payload: &Map<String, Value>) -> Result<NewSubmission, IntakeError> {
    let mut errors = Vec::new();

    let required = |v: &str| min_chars(v, 1);

    let first_name = check(text(payload, "firstName"), required, FIRST_NAME_MSG, &mut errors);
    let last_name = check(text(payload, "lastName"), required, LAST_NAME_MSG, &mut errors);
    let email = check(text(payload, "email"), is_valid_email, EMAIL_MSG, &mut errors);
    let phone = check(text(payload, "phone"), is_valid_phone, PHONE_MSG, &mut errors);
    let address = check(text(payload, "address"), required, ADDRESS_MSG, &mut errors);
    let postal_code = check(text(payload, "postalCode"), required, POSTAL_CODE_MSG, &mut errors);
    let business_idea = check(
        text(payload, "businessIdea"),
        |v| min_chars(v, BUSINESS_IDEA_MIN),
        BUSINESS_IDEA_MSG,
        &mut errors,
    );
    let requirements = check(
        text(payload, "requirements"),
        |v| min_chars(v, REQUIREMENTS_MIN),
        REQUIREMENTS_MSG,
        &mut errors,
    );

    let (
        Some(first_name),
        Some(last_name),
        Some(email),
        Some(phone),
        Some(address),
        Some(postal_code),
        Some(business_idea),
        Some(requirements),
    ) = (first_name, last_name, email, phone, address, postal_code, business_idea, requirements)
    else {
        return Err(IntakeError::ValidationFailed(errors));
    };

    Ok(NewSubmission {
        first_name: clean_text(first_name),
        last_name: clean_text(last_name),
        email: normalize_email(email),
        phone: clean_text(phone),
        address: clean_text(address),
        postal_code: clean_text(postal_code),
        business_idea: clean_text(business_idea),
        requirements: clean_text(requirements),
    })
}

/// Locale-agnostic phone check: an optional `+`, an optional parenthesised
/// area code, digit groups split by spaces, dots or dashes, 7 to 15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    if phone.len() > PHONE_MAX_LEN || phone.starts_with("+0") || !phone_re().is_match(phone) {
        return false;
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

fn text<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// At least `min` characters once surrounding whitespace is dropped.
pub(crate) fn min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

fn check<'a>(
    value: Option<&'a str>,
    rule: impl Fn(&str) -> bool,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    match value {
        Some(v) if rule(v) => Some(v),
        _ => {
            errors.push(message.to_string());
            None
        }
    }
}
