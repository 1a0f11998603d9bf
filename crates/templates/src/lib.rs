//! Form template catalogue.
//!
//! Templates are pre-built [`intake_core::FormSchema`]s keyed by specialty (nutrition, psychology, general).
//! This crate handles the on-disk YAML format and the read-only catalogue built from it:
//! - strict wire parsing with path-qualified error messages
//! - construction-time schema checks, so a broken template never reaches a session
//! - the embedded built-in catalogue plus optional templates from a configured directory
//!
//! Form behaviour (visibility, validation, sessions) lives in `intake-core`.

pub mod document;
pub mod library;

pub use document::{parse_schema_json, TemplateDocument};
pub use library::{TemplateEntry, TemplateLibrary};

use intake_core::FormError;

/// Errors returned by the `intake-templates` crate.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid form schema in template {key}: {source}")]
    InvalidSchema {
        key: String,
        #[source]
        source: FormError,
    },

    #[error("duplicate template key: {0}")]
    DuplicateKey(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results that can fail with a [`TemplateError`].
pub type TemplateResult<T> = Result<T, TemplateError>;
