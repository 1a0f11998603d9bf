//! Template document wire format.
//!
//! A template file is a YAML mapping:
//!
//! ```yaml
//! key: psychology
//! specialty: psychology
//! schema:
//!   title: Psychology Intake
//!   sections: [...]
//! ```
//!
//! Parsing uses `serde_path_to_error` so a mismatch reports where it happened (for example
//! `schema.sections[1].fields[0].type`). Every parsed schema is checked before it is returned.

use crate::{TemplateError, TemplateResult};
use intake_core::{FormSchema, NonEmptyText};
use serde::{Deserialize, Serialize};

/// A parsed and checked template.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDocument {
    pub key: String,
    pub specialty: NonEmptyText,
    pub schema: FormSchema,
}

impl TemplateDocument {
    /// Parse a template document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if:
    /// - the YAML does not match the wire schema (unknown keys, wrong types, bad patterns),
    /// - the key is not a lowercase slug,
    /// - the schema breaks a construction-time invariant.
    pub fn parse_yaml(yaml_text: &str) -> TemplateResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire: TemplateDocumentWire =
            serde_path_to_error::deserialize(deserializer).map_err(|err| {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_owned()
                } else {
                    path
                };
                TemplateError::Translation(format!("Template schema mismatch at {path}: {source}"))
            })?;

        wire_to_domain(wire)
    }

    /// Render the template back to YAML text.
    pub fn render_yaml(&self) -> TemplateResult<String> {
        let wire = TemplateDocumentWire {
            key: self.key.clone(),
            specialty: self.specialty.as_str().to_owned(),
            schema: self.schema.clone(),
        };
        Ok(serde_yaml::to_string(&wire)?)
    }
}

/// Parse a bare form schema from JSON, as produced by an external form builder.
pub fn parse_schema_json(json_text: &str) -> TemplateResult<FormSchema> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    let schema: FormSchema =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            TemplateError::Translation(format!(
                "Form schema mismatch at {path}: {}",
                err.into_inner()
            ))
        })?;
    deserializer.end().map_err(|err| {
        TemplateError::Translation(format!("Form schema has trailing content: {err}"))
    })?;

    schema.check().map_err(|source| TemplateError::InvalidSchema {
        key: schema.title.clone(),
        source,
    })?;

    Ok(schema)
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TemplateDocumentWire {
    key: String,
    specialty: String,
    schema: FormSchema,
}

fn wire_to_domain(wire: TemplateDocumentWire) -> TemplateResult<TemplateDocument> {
    validate_template_key(&wire.key)?;

    let specialty = NonEmptyText::new(&wire.specialty).map_err(|_| {
        TemplateError::InvalidInput(format!("template {} has an empty specialty", wire.key))
    })?;

    wire.schema
        .check()
        .map_err(|source| TemplateError::InvalidSchema {
            key: wire.key.clone(),
            source,
        })?;

    Ok(TemplateDocument {
        key: wire.key,
        specialty,
        schema: wire.schema,
    })
}

/// Template keys are lowercase slugs.
fn validate_template_key(key: &str) -> TemplateResult<()> {
    const MAX_KEY_LEN: usize = 64;

    if key.trim().is_empty() {
        return Err(TemplateError::InvalidInput(
            "template key cannot be empty".into(),
        ));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(TemplateError::InvalidInput(format!(
            "template key exceeds maximum length of {} characters",
            MAX_KEY_LEN
        )));
    }

    let ok = key
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'-' | b'_'));

    if !ok {
        return Err(TemplateError::InvalidInput(format!(
            "template key {key:?} contains invalid characters (only a-z, 0-9, '-', '_' allowed)"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{FieldType, FormError};

    const MINIMAL: &str = r#"key: check-in
specialty: general
schema:
  title: Check-in
  sections:
    - title: Today
      fields:
        - id: mood
          type: select
          label: Mood
          required: true
          options:
            - label: Good
              value: good
            - label: Bad
              value: bad
"#;

    #[test]
    fn parses_minimal_template() {
        let doc = TemplateDocument::parse_yaml(MINIMAL).expect("parse template");
        assert_eq!(doc.key, "check-in");
        assert_eq!(doc.specialty.as_str(), "general");
        let mood = doc.schema.field("mood").expect("mood field");
        assert_eq!(mood.field_type, FieldType::Select);
        assert_eq!(mood.options().len(), 2);
    }

    #[test]
    fn round_trips_through_yaml() {
        let doc = TemplateDocument::parse_yaml(MINIMAL).expect("parse template");
        let rendered = doc.render_yaml().expect("render template");
        let reparsed = TemplateDocument::parse_yaml(&rendered).expect("reparse template");
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn reports_path_of_unknown_field_type() {
        let input = MINIMAL.replace("type: select", "type: slider");
        let err = TemplateDocument::parse_yaml(&input).expect_err("should reject type");
        match err {
            TemplateError::Translation(msg) => {
                assert!(msg.contains("schema.sections[0].fields[0].type"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let input = format!("{MINIMAL}author: someone\n");
        let err = TemplateDocument::parse_yaml(&input).expect_err("should reject unknown key");
        match err {
            TemplateError::Translation(msg) => assert!(msg.contains("author")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_uncompilable_pattern_at_load() {
        let input = MINIMAL.replace(
            "          required: true\n",
            "          required: true\n          validation:\n            pattern: '([a-z'\n",
        );
        let err = TemplateDocument::parse_yaml(&input).expect_err("should reject pattern");
        match err {
            TemplateError::Translation(msg) => assert!(msg.contains("pattern"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_schema_invariant_violations() {
        let input = MINIMAL.replace(
            "          options:\n            - label: Good\n              value: good\n            - label: Bad\n              value: bad\n",
            "",
        );
        let err = TemplateDocument::parse_yaml(&input).expect_err("should reject missing options");
        assert!(matches!(
            err,
            TemplateError::InvalidSchema { key, source: FormError::MissingOptions { .. } } if key == "check-in"
        ));
    }

    #[test]
    fn rejects_invalid_keys() {
        let input = MINIMAL.replace("key: check-in", "key: Check In");
        let err = TemplateDocument::parse_yaml(&input).expect_err("should reject key");
        assert!(matches!(err, TemplateError::InvalidInput(msg) if msg.contains("invalid characters")));
    }

    #[test]
    fn parses_builder_json_schema() {
        let json = r#"{
            "title": "Quick screen",
            "sections": [{"fields": [
                {"id": "q1", "type": "radio", "label": "Q1",
                 "options": [{"label": "Yes", "value": "yes"}, {"label": "No", "value": "no"}]},
                {"id": "q1_why", "type": "text", "label": "Why?",
                 "conditionalOn": {"fieldId": "q1", "value": "yes", "operator": "equals"}}
            ]}]
        }"#;
        let schema = parse_schema_json(json).expect("parse schema");
        assert_eq!(schema.fields().count(), 2);

        let err = parse_schema_json(r#"{"title": "X", "sections": [{"fields": [{"id": "a"}]}]}"#)
            .expect_err("missing type");
        match err {
            TemplateError::Translation(msg) => assert!(msg.contains("sections[0].fields[0]"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_trailing_content_after_builder_schema() {
        let err = parse_schema_json(r#"{"title": "X", "sections": []} {"extra": true}"#)
            .expect_err("should reject trailing content");
        match err {
            TemplateError::Translation(msg) => assert!(msg.contains("trailing"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }

        let schema = parse_schema_json("{\"title\": \"X\", \"sections\": []}\n  ")
            .expect("trailing whitespace is fine");
        assert_eq!(schema.title, "X");
    }
}
