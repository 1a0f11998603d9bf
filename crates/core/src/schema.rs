//! Form schema model.
//!
//! A [`FormSchema`] is plain data: sections of fields with their options, validation rules and
//! conditional rules. Schemas are loaded once (from the template catalogue or an external form
//! builder), checked with [`FormSchema::check`], and then shared read-only for the lifetime of
//! every session that uses them.
//!
//! The serialised shape uses camelCase keys (`helpText`, `conditionalOn`, `patternMessage`) and
//! rejects unknown keys.

use crate::{FormError, FormFieldValue, FormResult};
use intake_types::{FieldId, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of input a field renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Phone,
    Date,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    File,
    SectionHeader,
    Scale,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
            FieldType::SectionHeader => "section_header",
            FieldType::Scale => "scale",
        }
    }

    /// Section headers are layout only and never carry an answer.
    pub fn holds_value(self) -> bool {
        self != FieldType::SectionHeader
    }

    /// Types that cannot be rendered without a non-empty options list.
    pub fn requires_options(self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Multiselect | FieldType::Radio
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout hint for a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
}

/// One selectable choice. `value` is what gets stored and compared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A regular expression compiled when the schema is loaded.
///
/// Deserialising a pattern that does not compile fails, so a loaded schema never carries a
/// broken pattern.
#[derive(Clone, Debug)]
pub struct Pattern(regex::Regex);

impl Pattern {
    pub fn new(source: &str) -> FormResult<Self> {
        Ok(Self(regex::Regex::new(source)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search, like a browser `RegExp.test`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Optional per-field constraints.
///
/// `min`/`max` are inclusive numeric bounds; they are enforced for `number` fields and act as
/// range hints for `scale` widgets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Comparison used by a conditional rule.
///
/// Unknown tokens are kept verbatim in [`ConditionOperator::Other`]; such rules never hide
/// their field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    Other(String),
}

impl From<String> for ConditionOperator {
    fn from(token: String) -> Self {
        match token.as_str() {
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            _ => ConditionOperator::Other(token),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(operator: ConditionOperator) -> Self {
        match operator {
            ConditionOperator::Equals => "equals".to_owned(),
            ConditionOperator::NotEquals => "not_equals".to_owned(),
            ConditionOperator::Contains => "contains".to_owned(),
            ConditionOperator::Other(token) => token,
        }
    }
}

/// Makes a field relevant only while another field's answer satisfies a comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Condition {
    pub field_id: FieldId,
    pub value: FormFieldValue,
    #[serde(default)]
    pub operator: ConditionOperator,
}

impl Condition {
    pub fn new(field_id: FieldId, value: impl Into<FormFieldValue>) -> Self {
        Self {
            field_id,
            value: value.into(),
            operator: ConditionOperator::Equals,
        }
    }

    pub fn with_operator(mut self, operator: ConditionOperator) -> Self {
        self.operator = operator;
        self
    }
}

/// One question of a form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_on: Option<Condition>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub width: FieldWidth,
}

impl FormField {
    /// Creates an optional, unconditional field with order 0.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidFieldId` if `id` is blank or contains whitespace.
    pub fn new(
        id: impl AsRef<str>,
        field_type: FieldType,
        label: impl Into<String>,
    ) -> FormResult<Self> {
        Ok(Self {
            id: FieldId::new(id)?,
            field_type,
            label: label.into(),
            placeholder: None,
            help_text: None,
            required: false,
            options: None,
            validation: None,
            conditional_on: None,
            order: 0,
            width: FieldWidth::Full,
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_width(mut self, width: FieldWidth) -> Self {
        self.width = width;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn conditional_on(mut self, condition: Condition) -> Self {
        self.conditional_on = Some(condition);
        self
    }

    /// Width actually used for layout. Text areas and section headers always span the row.
    pub fn effective_width(&self) -> FieldWidth {
        match self.field_type {
            FieldType::Textarea | FieldType::SectionHeader => FieldWidth::Full,
            _ => self.width,
        }
    }

    pub fn options(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or_default()
    }

    /// A checkbox with options is a group of checkboxes storing a list of values.
    pub fn is_checkbox_group(&self) -> bool {
        self.field_type == FieldType::Checkbox && self.options.is_some()
    }
}

/// A titled group of fields, rendered in declaration order relative to other sections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormSection {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
            fields,
        }
    }

    /// Fields in presentation order: ascending `order`, ties kept in declaration order.
    pub fn ordered_fields(&self) -> Vec<&FormField> {
        let mut fields: Vec<&FormField> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.order);
        fields
    }
}

/// A complete questionnaire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub sections: Vec<FormSection>,
}

impl FormSchema {
    pub fn new(title: impl Into<String>, sections: Vec<FormSection>) -> Self {
        Self {
            title: title.into(),
            description: None,
            version: None,
            sections,
        }
    }

    /// All fields across all sections, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    /// All fields in presentation order: sections as declared, fields sorted within each.
    pub fn ordered_fields(&self) -> Vec<&FormField> {
        self.sections
            .iter()
            .flat_map(|section| section.ordered_fields())
            .collect()
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields().find(|field| field.id.as_str() == id)
    }

    /// Verifies the construction-time invariants of a schema.
    ///
    /// # Errors
    ///
    /// Returns the first violation found:
    /// - an empty title,
    /// - duplicate field ids,
    /// - a missing or empty options list where one is required,
    /// - a required section header,
    /// - a condition on an unknown field or on the field itself.
    pub fn check(&self) -> FormResult<()> {
        NonEmptyText::new(&self.title)
            .map_err(|_| FormError::InvalidInput("form title cannot be empty".into()))?;

        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::DuplicateFieldId(field.id.clone()));
            }

            let options_missing = match &field.options {
                None => field.field_type.requires_options(),
                Some(options) => {
                    options.is_empty()
                        && (field.field_type.requires_options()
                            || field.field_type == FieldType::Checkbox)
                }
            };
            if options_missing {
                return Err(FormError::MissingOptions {
                    field_id: field.id.clone(),
                    field_type: field.field_type,
                });
            }

            if field.required && !field.field_type.holds_value() {
                return Err(FormError::RequiredSectionHeader(field.id.clone()));
            }
        }

        for field in self.fields() {
            let Some(condition) = &field.conditional_on else {
                continue;
            };
            if condition.field_id == field.id {
                return Err(FormError::SelfDependency(field.id.clone()));
            }
            if !seen.contains(condition.field_id.as_str()) {
                return Err(FormError::UnknownDependency {
                    field_id: field.id.clone(),
                    target: condition.field_id.clone(),
                });
            }
        }

        Ok(())
    }
}
