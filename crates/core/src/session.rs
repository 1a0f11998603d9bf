//! Form session controller.
//!
//! A [`FormSession`] owns the in-progress answers and the current error set for one form. Edits
//! clear the edited field's error without re-validating; [`FormSession::submit`] validates every
//! visible field and only hands the responses to the [`SubmitHandler`] when nothing fails.
//!
//! ```text
//! Editing -> (submit) -> EditingWithErrors | Submitted
//! ```
//!
//! Responses are copy-on-write: [`FormSession::snapshot`] returns a shared handle that later
//! edits never change.

use crate::schema::{FormField, FormSchema};
use crate::validation::validate_form;
use crate::value::{FieldErrors, FormFieldValue, FormResponses};
use crate::visibility;
use crate::{FormError, FormResult};
use std::sync::Arc;

/// External collaborator that receives validated responses.
///
/// Any `FnMut(&FormResponses) -> Result<(), E>` closure is a handler.
pub trait SubmitHandler {
    type Error;

    /// Called exactly once per successful validation.
    fn on_submit(&mut self, responses: &FormResponses) -> Result<(), Self::Error>;

    /// Called when the user abandons the form.
    fn on_cancel(&mut self) {}
}

impl<F, E> SubmitHandler for F
where
    F: FnMut(&FormResponses) -> Result<(), E>,
{
    type Error = E;

    fn on_submit(&mut self, responses: &FormResponses) -> Result<(), E> {
        self(responses)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    EditingWithErrors,
    Submitted,
}

/// Result of a submit attempt that did not fail in the handler.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the handler was not called.
    Rejected(FieldErrors),
    /// The handler accepted the responses.
    Submitted,
}

pub struct FormSession<H> {
    schema: Arc<FormSchema>,
    responses: Arc<FormResponses>,
    errors: FieldErrors,
    state: SessionState,
    handler: H,
}

impl<H: SubmitHandler> FormSession<H> {
    pub fn new(schema: Arc<FormSchema>, handler: H) -> Self {
        Self::with_responses(schema, FormResponses::new(), handler)
    }

    /// Starts a session pre-seeded with earlier answers, for edit flows.
    ///
    /// Keys belonging to section headers are dropped. Keys unknown to the schema are kept as-is.
    pub fn with_responses(schema: Arc<FormSchema>, mut seed: FormResponses, handler: H) -> Self {
        seed.retain(|id, _| {
            schema
                .field(id.as_str())
                .map_or(true, |field| field.field_type.holds_value())
        });

        Self {
            schema,
            responses: Arc::new(seed),
            errors: FieldErrors::new(),
            state: SessionState::Editing,
            handler,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn responses(&self) -> &FormResponses {
        &self.responses
    }

    /// Shared handle to the current responses. Unaffected by later edits.
    pub fn snapshot(&self) -> Arc<FormResponses> {
        Arc::clone(&self.responses)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Fields the renderer should currently show, in presentation order.
    pub fn visible_fields(&self) -> Vec<&FormField> {
        visibility::visible_fields(&self.schema, &self.responses)
    }

    /// Records an answer and clears any current error for that field.
    ///
    /// # Errors
    ///
    /// Returns `FormError::UnknownField` if the schema has no such field and
    /// `FormError::NotAnInput` for section headers.
    pub fn set_value(
        &mut self,
        field_id: &str,
        value: impl Into<FormFieldValue>,
    ) -> FormResult<()> {
        let field = self
            .schema
            .field(field_id)
            .ok_or_else(|| FormError::UnknownField(field_id.to_owned()))?;
        if !field.field_type.holds_value() {
            return Err(FormError::NotAnInput(field.id.clone()));
        }
        let id = field.id.clone();

        Arc::make_mut(&mut self.responses).insert(id, value.into());

        if self.errors.shift_remove(field_id).is_some() {
            tracing::trace!(field = field_id, "cleared field error on edit");
        }
        self.state = if self.errors.is_empty() {
            SessionState::Editing
        } else {
            SessionState::EditingWithErrors
        };

        Ok(())
    }

    /// Validates the visible fields and, if all pass, hands the responses to the handler.
    ///
    /// On rejection the error set is replaced and the responses are left untouched. On success
    /// responses and errors are left as they are; the handler owns what happens next.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error. The session stays in its editing state in that case.
    pub fn submit(&mut self) -> Result<SubmitOutcome, H::Error> {
        let errors = validate_form(&self.schema, &self.responses);

        if !errors.is_empty() {
            tracing::debug!(
                form = %self.schema.title,
                errors = errors.len(),
                "submission rejected"
            );
            self.errors = errors.clone();
            self.state = SessionState::EditingWithErrors;
            return Ok(SubmitOutcome::Rejected(errors));
        }

        self.handler.on_submit(&self.responses)?;
        tracing::info!(
            form = %self.schema.title,
            answers = self.responses.len(),
            "form submitted"
        );
        self.state = SessionState::Submitted;

        Ok(SubmitOutcome::Submitted)
    }

    /// Notifies the handler that the form was abandoned. Session state is not changed.
    pub fn cancel(&mut self) {
        self.handler.on_cancel();
    }
}
