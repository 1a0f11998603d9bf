//! # Intake Core
//!
//! Core logic for data-driven clinical questionnaires (anamnesis, intake forms, check-ins).
//!
//! This crate contains pure, in-memory form operations:
//! - The schema model: fields, sections, options, validation and conditional rules
//! - Visibility evaluation of conditional fields against the current responses
//! - Field and form validation producing one message per field
//! - The form session controller that gates submission on validation
//! - Input coercion and widget dispatch for rendering collaborators
//!
//! **No I/O concerns**: template catalogues live in `intake-templates`, HTTP serving in the
//! `intake-run` binary. Persistence is an external collaborator reached through
//! [`session::SubmitHandler`].

pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod render;
pub mod schema;
pub mod session;
pub mod validation;
pub mod value;
pub mod visibility;

pub use config::IntakeConfig;
pub use error::{FormError, FormResult};
pub use intake_types::{FieldId, NonEmptyText, TextError};
pub use schema::{
    Condition, ConditionOperator, FieldOption, FieldType, FieldWidth, FormField, FormSchema,
    FormSection, Pattern, ValidationRules,
};
pub use session::{FormSession, SessionState, SubmitHandler, SubmitOutcome};
pub use validation::{validate_field, validate_form};
pub use value::{FieldErrors, FormFieldValue, FormResponses};
pub use visibility::is_visible;
