//! Response values and the maps built from them.
//!
//! Values follow the loose typing of the browser forms that produce them: comparisons in
//! conditional rules are made on a string coercion of the value, and "truthiness" decides
//! whether format rules apply at all.

use crate::{FormError, FormResult};
use indexmap::IndexMap;
use intake_types::FieldId;
use serde::{Deserialize, Serialize};

/// Current answers keyed by field id, in insertion order.
pub type FormResponses = IndexMap<FieldId, FormFieldValue>;

/// One validation message per field id, in schema order.
pub type FieldErrors = IndexMap<FieldId, String>;

/// A single answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormFieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FormFieldValue {
    /// `true` for values the required rule treats as missing: `null` and the empty string.
    ///
    /// An empty list is *not* missing.
    pub fn is_blank(&self) -> bool {
        match self {
            FormFieldValue::Null => true,
            FormFieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            FormFieldValue::Null => false,
            FormFieldValue::Bool(b) => *b,
            FormFieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FormFieldValue::Text(s) => !s.is_empty(),
            FormFieldValue::List(_) => true,
        }
    }

    /// Numeric reading used by bound checks. Strings are trimmed and parsed; anything that
    /// does not parse has no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormFieldValue::Number(n) => Some(*n),
            FormFieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FormFieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormFieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormFieldValue::Null => f.write_str("null"),
            FormFieldValue::Bool(b) => write!(f, "{b}"),
            FormFieldValue::Number(n) => f.write_str(&format_number(*n)),
            FormFieldValue::Text(s) => f.write_str(s),
            FormFieldValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// String coercion of a possibly absent value. An absent value reads as `"undefined"`.
pub fn coerce_to_string(value: Option<&FormFieldValue>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "undefined".to_owned(),
    }
}

/// Formats a number the way the form UI prints it: integral values have no fraction.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Parse a JSON object into a response map.
pub fn responses_from_json(json: &str) -> FormResult<FormResponses> {
    serde_json::from_str(json).map_err(FormError::Deserialization)
}

impl From<&str> for FormFieldValue {
    fn from(value: &str) -> Self {
        FormFieldValue::Text(value.to_owned())
    }
}

impl From<String> for FormFieldValue {
    fn from(value: String) -> Self {
        FormFieldValue::Text(value)
    }
}

impl From<f64> for FormFieldValue {
    fn from(value: f64) -> Self {
        FormFieldValue::Number(value)
    }
}

impl From<i32> for FormFieldValue {
    fn from(value: i32) -> Self {
        FormFieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FormFieldValue {
    fn from(value: bool) -> Self {
        FormFieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FormFieldValue {
    fn from(value: Vec<String>) -> Self {
        FormFieldValue::List(value)
    }
}

impl From<Vec<&str>> for FormFieldValue {
    fn from(value: Vec<&str>) -> Self {
        FormFieldValue::List(value.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_values_to_strings() {
        assert_eq!(coerce_to_string(None), "undefined");
        assert_eq!(coerce_to_string(Some(&FormFieldValue::Null)), "null");
        assert_eq!(coerce_to_string(Some(&true.into())), "true");
        assert_eq!(coerce_to_string(Some(&20.into())), "20");
        assert_eq!(coerce_to_string(Some(&FormFieldValue::Number(19.5))), "19.5");
        assert_eq!(coerce_to_string(Some(&FormFieldValue::Number(-0.0))), "0");
        assert_eq!(
            coerce_to_string(Some(&vec!["anxiety", "insomnia"].into())),
            "anxiety,insomnia"
        );
    }

    #[test]
    fn blank_values_are_null_and_empty_string_only() {
        assert!(FormFieldValue::Null.is_blank());
        assert!(FormFieldValue::from("").is_blank());
        assert!(!FormFieldValue::from(" ").is_blank());
        assert!(!FormFieldValue::from(0).is_blank());
        assert!(!FormFieldValue::from(false).is_blank());
        assert!(!FormFieldValue::List(Vec::new()).is_blank());
    }

    #[test]
    fn truthiness_matches_form_semantics() {
        assert!(!FormFieldValue::from(0).is_truthy());
        assert!(!FormFieldValue::Number(f64::NAN).is_truthy());
        assert!(!FormFieldValue::from("").is_truthy());
        assert!(FormFieldValue::List(Vec::new()).is_truthy());
        assert!(FormFieldValue::from("x").is_truthy());
    }

    #[test]
    fn parses_numbers_from_text() {
        assert_eq!(FormFieldValue::from(" 72.5 ").as_number(), Some(72.5));
        assert_eq!(FormFieldValue::from("seventy").as_number(), None);
        assert_eq!(FormFieldValue::from(true).as_number(), None);
    }

    #[test]
    fn deserializes_every_value_shape() {
        let responses = responses_from_json(
            r#"{"name":"Ana","age":34,"smoker":false,"goals":["weight_loss"],"notes":null}"#,
        )
        .expect("parse responses");

        assert_eq!(responses.get("name"), Some(&FormFieldValue::from("Ana")));
        assert_eq!(responses.get("age"), Some(&FormFieldValue::Number(34.0)));
        assert_eq!(responses.get("smoker"), Some(&FormFieldValue::Bool(false)));
        assert_eq!(
            responses.get("goals"),
            Some(&FormFieldValue::from(vec!["weight_loss"]))
        );
        assert_eq!(responses.get("notes"), Some(&FormFieldValue::Null));
        let keys: Vec<&str> = responses.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["name", "age", "smoker", "goals", "notes"]);
    }

    #[test]
    fn rejects_non_object_responses() {
        let err = responses_from_json("[1, 2]").expect_err("should reject array");
        assert!(matches!(err, FormError::Deserialization(_)));
    }
}
