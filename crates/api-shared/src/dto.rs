//! Request and response bodies.
//!
//! Form schemas, response maps and error maps are documented as free-form objects; their shape
//! is owned by `intake-core`.

use intake_core::{FieldErrors, FormResponses, FormSchema};
use intake_templates::TemplateEntry;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TemplateSummary {
    pub key: String,
    pub specialty: String,
    pub title: String,
    pub version: Option<String>,
    pub field_count: usize,
}

impl From<&TemplateEntry> for TemplateSummary {
    fn from(entry: &TemplateEntry) -> Self {
        Self {
            key: entry.key.clone(),
            specialty: entry.specialty.clone(),
            title: entry.schema.title.clone(),
            version: entry.schema.version.clone(),
            field_count: entry
                .schema
                .fields()
                .filter(|field| field.field_type.holds_value())
                .count(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListTemplatesRes {
    pub default_key: String,
    pub templates: Vec<TemplateSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateRes {
    pub key: String,
    pub specialty: String,
    #[schema(value_type = Object)]
    pub schema: FormSchema,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidateReq {
    #[schema(value_type = Object)]
    pub responses: FormResponses,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidateRes {
    pub valid: bool,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    /// Visible fields whose own dependency is hidden.
    pub hidden_dependencies: Vec<String>,
}
