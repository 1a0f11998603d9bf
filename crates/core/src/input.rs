//! Coercion of raw widget input into response values.
//!
//! Renderers receive text from their inputs; these helpers turn it into the value shape each
//! field type stores before calling [`crate::FormSession::set_value`].

use crate::schema::{FieldType, FormField};
use crate::value::FormFieldValue;

/// Converts raw widget text into the value stored for `field`.
///
/// - `number`/`scale`: a number; empty input stays `""`, unparsable input is kept verbatim
/// - single `checkbox`: `true` for `"true"`, `"on"` or `"1"`, otherwise `false`
/// - everything else: the text as entered
pub fn coerce_input(field: &FormField, raw: &str) -> FormFieldValue {
    match field.field_type {
        FieldType::Number | FieldType::Scale => {
            if raw.trim().is_empty() {
                return FormFieldValue::Text(String::new());
            }
            match raw.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => FormFieldValue::Number(number),
                _ => FormFieldValue::Text(raw.to_owned()),
            }
        }
        FieldType::Checkbox if !field.is_checkbox_group() => {
            FormFieldValue::Bool(matches!(raw.trim(), "true" | "on" | "1"))
        }
        _ => FormFieldValue::Text(raw.to_owned()),
    }
}

/// Toggles `option_value` in a multi-value answer (`multiselect` or checkbox group).
///
/// Removes the value if present, otherwise appends it. A non-list current value is replaced.
pub fn toggle_option(current: Option<&FormFieldValue>, option_value: &str) -> FormFieldValue {
    let mut selected: Vec<String> = current
        .and_then(FormFieldValue::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default();

    if let Some(position) = selected.iter().position(|v| v == option_value) {
        selected.remove(position);
    } else {
        selected.push(option_value.to_owned());
    }

    FormFieldValue::List(selected)
}
