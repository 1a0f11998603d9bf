use crate::schema::FieldType;
use intake_types::FieldId;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid field id: {0}")]
    InvalidFieldId(#[from] intake_types::TextError),
    #[error("duplicate field id: {0}")]
    DuplicateFieldId(FieldId),
    #[error("field {field_id} of type {field_type} requires a non-empty options list")]
    MissingOptions {
        field_id: FieldId,
        field_type: FieldType,
    },
    #[error("invalid validation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("section header {0} cannot be required")]
    RequiredSectionHeader(FieldId),
    #[error("field {field_id} is conditional on unknown field {target}")]
    UnknownDependency { field_id: FieldId, target: FieldId },
    #[error("field {0} cannot be conditional on itself")]
    SelfDependency(FieldId),

    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("section header {0} does not hold a value")]
    NotAnInput(FieldId),

    #[error("failed to read template directory: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize responses: {0}")]
    Deserialization(serde_json::Error),
}

pub type FormResult<T> = std::result::Result<T, FormError>;
