//! Field and form validation.
//!
//! Rules are applied in a fixed order and the first failing rule wins, so every field yields at
//! most one message:
//!
//! 1. required: the value is absent, `null` or `""`
//! 2. numeric bounds: `number` fields only, inclusive `min`/`max`
//! 3. email format: `email` fields with a truthy value
//! 4. pattern: any field with a `pattern` and a truthy value
//!
//! Validation is total: it never fails, it only reports messages.

use crate::constants::{INVALID_EMAIL_MESSAGE, INVALID_FORMAT_MESSAGE, REQUIRED_SUFFIX};
use crate::schema::{FieldType, FormField, FormSchema};
use crate::value::{format_number, FieldErrors, FormFieldValue, FormResponses};
use crate::visibility::is_visible;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

/// Validates one value against one field. Returns the error message, if any.
pub fn validate_field(field: &FormField, value: Option<&FormFieldValue>) -> Option<String> {
    let value = match value {
        Some(value) if !value.is_blank() => value,
        _ => {
            if field.required {
                return Some(format!("{} {}", field.label, REQUIRED_SUFFIX));
            }
            return None;
        }
    };

    let rules = field.validation.as_ref();

    if field.field_type == FieldType::Number {
        if let (Some(number), Some(rules)) = (value.as_number(), rules) {
            if let Some(min) = rules.min {
                if number < min {
                    return Some(format!(
                        "{} must be at least {}",
                        field.label,
                        format_number(min)
                    ));
                }
            }
            if let Some(max) = rules.max {
                if number > max {
                    return Some(format!(
                        "{} must be at most {}",
                        field.label,
                        format_number(max)
                    ));
                }
            }
        }
    }

    if field.field_type == FieldType::Email
        && value.is_truthy()
        && !EMAIL_RE.is_match(&value.to_string())
    {
        return Some(INVALID_EMAIL_MESSAGE.to_owned());
    }

    if let Some(rules) = rules {
        if let Some(pattern) = &rules.pattern {
            if value.is_truthy() && !pattern.is_match(&value.to_string()) {
                return Some(
                    rules
                        .pattern_message
                        .clone()
                        .unwrap_or_else(|| INVALID_FORMAT_MESSAGE.to_owned()),
                );
            }
        }
    }

    None
}

/// Validates every currently visible field of `schema`.
///
/// Hidden fields are skipped even when they are required or hold stale values. Section headers
/// hold no value and are never validated. Errors are keyed in schema declaration order.
pub fn validate_form(schema: &FormSchema, responses: &FormResponses) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in schema.fields() {
        if !field.field_type.holds_value() || !is_visible(field, responses) {
            continue;
        }
        if let Some(message) = validate_field(field, responses.get(field.id.as_str())) {
            errors.insert(field.id.clone(), message);
        }
    }

    tracing::debug!(
        form = %schema.title,
        errors = errors.len(),
        "validated form"
    );

    errors
}
