//! Constants used throughout the intake core crate.

/// Specialty whose template is offered when the caller does not choose one.
pub const DEFAULT_SPECIALTY: &str = "general";

/// Default listen address for the REST service.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// File extensions recognised as form template documents.
pub const TEMPLATE_FILE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Environment variable naming an extra template directory.
pub const TEMPLATE_DIR_ENV: &str = "INTAKE_TEMPLATE_DIR";

/// Environment variable overriding [`DEFAULT_SPECIALTY`].
pub const DEFAULT_SPECIALTY_ENV: &str = "INTAKE_DEFAULT_SPECIALTY";

/// Environment variable overriding [`DEFAULT_REST_ADDR`].
pub const REST_ADDR_ENV: &str = "INTAKE_REST_ADDR";

/// Message used when a required field has no value.
pub const REQUIRED_SUFFIX: &str = "is required";

/// Message used when an email field does not look like an address.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";

/// Message used when a pattern fails and the field gives no override.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format";
