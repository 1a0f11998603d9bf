//! # API Shared
//!
//! Shared request/response types and services for the intake APIs.
//!
//! Contains:
//! - Wire DTOs (`dto` module), serialisable and documented for OpenAPI
//! - `HealthService` for liveness checks
//! - `TemplateService`, the API-facing view of the template catalogue

pub mod dto;
pub mod health;
pub mod service;

pub use dto::*;
pub use health::HealthService;
pub use service::TemplateService;
