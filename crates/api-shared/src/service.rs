use crate::{ListTemplatesRes, TemplateRes, TemplateSummary, ValidateRes};
use intake_core::visibility::hidden_dependencies;
use intake_core::{validate_form, FormResponses};
use intake_templates::TemplateLibrary;
use std::sync::Arc;

/// Read-only operations over the template catalogue, shaped for API responses.
#[derive(Clone)]
pub struct TemplateService {
    library: Arc<TemplateLibrary>,
    default_key: String,
}

impl TemplateService {
    pub fn new(library: Arc<TemplateLibrary>, default_key: impl Into<String>) -> Self {
        Self {
            library,
            default_key: default_key.into(),
        }
    }

    pub fn list(&self) -> ListTemplatesRes {
        ListTemplatesRes {
            default_key: self.default_key.clone(),
            templates: self.library.entries().map(TemplateSummary::from).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<TemplateRes> {
        self.library.entry(key).map(|entry| TemplateRes {
            key: entry.key.clone(),
            specialty: entry.specialty.clone(),
            schema: entry.schema.as_ref().clone(),
        })
    }

    /// Validates a response map against a template. `None` if the template does not exist.
    pub fn validate(&self, key: &str, responses: &FormResponses) -> Option<ValidateRes> {
        let schema = self.library.get(key)?;
        let errors = validate_form(&schema, responses);
        let hidden = hidden_dependencies(&schema, responses)
            .into_iter()
            .map(|field| field.id.to_string())
            .collect();

        Some(ValidateRes {
            valid: errors.is_empty(),
            errors,
            hidden_dependencies: hidden,
        })
    }
}
