//! Partial-update statement builder.
//!
//! Only columns from the fixed [`FIELDS`] table can ever appear in the SQL
//! text; values are always bound. Placeholders are numbered in the order
//! columns are appended, and the record id is bound last.

use serde_json::{Map, Value};

use super::email::{is_valid_email, normalize_email};
use super::sanitize::clean_text;
use super::validate::{
    is_valid_phone, min_chars, ADDRESS_MSG, BUSINESS_IDEA_MIN, BUSINESS_IDEA_MSG, EMAIL_MSG,
    FIRST_NAME_MSG, LAST_NAME_MSG, PHONE_MSG, POSTAL_CODE_MSG, REQUIREMENTS_MIN, REQUIREMENTS_MSG,
};
use super::IntakeError;

/// The creation rule a column's new value must still satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    MinChars(usize, &'static str),
    Email,
    Phone,
    Free,
}

impl Check {
    fn verify(self, value: &str) -> Result<(), &'static str> {
        let (ok, message) = match self {
            Check::MinChars(min, message) => (min_chars(value, min), message),
            Check::Email => (is_valid_email(value), EMAIL_MSG),
            Check::Phone => (is_valid_phone(value), PHONE_MSG),
            Check::Free => return Ok(()),
        };

        if ok {
            Ok(())
        } else {
            Err(message)
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub key: &'static str,
    pub column: &'static str,
    nullable: bool,
    check: Check,
}

const fn field(key: &'static str, column: &'static str, check: Check) -> Field {
    Field {
        key,
        column,
        nullable: false,
        check,
    }
}

/// Accepted payload keys and their columns, in statement order.
pub const FIELDS: &[Field] = &[
    field("firstName", "first_name", Check::MinChars(1, FIRST_NAME_MSG)),
    field("lastName", "last_name", Check::MinChars(1, LAST_NAME_MSG)),
    field("email", "email", Check::Email),
    field("phone", "phone", Check::Phone),
    field("address", "address", Check::MinChars(1, ADDRESS_MSG)),
    field("postalCode", "postal_code", Check::MinChars(1, POSTAL_CODE_MSG)),
    field(
        "businessIdea",
        "business_idea",
        Check::MinChars(BUSINESS_IDEA_MIN, BUSINESS_IDEA_MSG),
    ),
    field(
        "requirements",
        "requirements",
        Check::MinChars(REQUIREMENTS_MIN, REQUIREMENTS_MSG),
    ),
    Field {
        key: "notes",
        column: "notes",
        nullable: true,
        check: Check::Free,
    },
];

/// Placeholder syntax of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...` (Postgres)
    #[default]
    Dollar,
    /// `?` (MySQL, SQLite)
    QuestionMark,
}

impl PlaceholderStyle {
    fn placeholder(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Dollar => format!("${index}"),
            PlaceholderStyle::QuestionMark => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Text(String),
    Null,
    Id(i32),
}

/// A ready-to-execute `UPDATE` with its bind values in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub sql: String,
    pub columns: Vec<&'static str>,
    pub values: Vec<BoundValue>,
}

/// Build the `UPDATE` for the fields present in `changes`.
///
/// Unknown keys are ignored. Values must pass the same rule and get the
/// same sanitisation as on creation; `updated_at` is always refreshed. The
/// caller must already know that `id` exists.
pub fn build_update(
    id: i32,
    changes: &Map<String, Value>,
    style: PlaceholderStyle,
) -> Result<UpdateStatement, IntakeError> {
    let mut assignments = Vec::new();
    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut errors = Vec::new();

    for field in FIELDS {
        let Some(raw) = changes.get(field.key) else {
            continue;
        };

        let value = match bound_value(field, raw) {
            Ok(value) => value,
            Err(message) => {
                errors.push(message);
                continue;
            }
        };

        values.push(value);
        columns.push(field.column);
        let placeholder = style.placeholder(values.len());
        assignments.push(format!("{} = {placeholder}", field.column));
    }

    if !errors.is_empty() {
        return Err(IntakeError::ValidationFailed(errors));
    }
    if assignments.is_empty() {
        return Err(IntakeError::NoFieldsProvided);
    }

    assignments.push("updated_at = NOW()".to_string());
    values.push(BoundValue::Id(id));

    let sql = format!(
        "UPDATE submissions SET {} WHERE id = {}",
        assignments.join(", "),
        style.placeholder(values.len())
    );

    Ok(UpdateStatement { sql, columns, values })
}

fn bound_value(field: &Field, raw: &Value) -> Result<BoundValue, String> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null if field.nullable => return Ok(BoundValue::Null),
        Value::Null => return Err(format!("{} cannot be null", field.key)),
        Value::Array(_) | Value::Object(_) => {
            return Err(format!("{} must be a string", field.key));
        }
    };

    field.check.verify(&text).map_err(str::to_string)?;

    Ok(BoundValue::Text(match field.check {
        Check::Email => normalize_email(&text),
        _ => clean_text(&text),
    }))
}
