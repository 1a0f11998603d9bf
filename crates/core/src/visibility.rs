//! Conditional visibility.
//!
//! Each field's `conditionalOn` rule is evaluated on its own against the current responses.
//! There is no cascade: a field whose dependency is itself hidden can still be visible by its
//! own rule. [`hidden_dependencies`] reports those fields so callers can notice them.

use crate::schema::{Condition, ConditionOperator, FormField, FormSchema};
use crate::value::{coerce_to_string, FormResponses};

/// Whether `field` is currently shown.
///
/// Pure: the result depends only on `responses[field.conditional_on.field_id]`.
pub fn is_visible(field: &FormField, responses: &FormResponses) -> bool {
    match &field.conditional_on {
        None => true,
        Some(condition) => condition_holds(condition, responses),
    }
}

fn condition_holds(condition: &Condition, responses: &FormResponses) -> bool {
    let current = coerce_to_string(responses.get(condition.field_id.as_str()));
    let target = condition.value.to_string();

    match &condition.operator {
        ConditionOperator::Equals => current == target,
        ConditionOperator::NotEquals => current != target,
        ConditionOperator::Contains => current.contains(target.as_str()),
        ConditionOperator::Other(_) => true,
    }
}

/// Visible, value-holding fields in presentation order.
pub fn visible_fields<'a>(schema: &'a FormSchema, responses: &FormResponses) -> Vec<&'a FormField> {
    schema
        .ordered_fields()
        .into_iter()
        .filter(|field| field.field_type.holds_value() && is_visible(field, responses))
        .collect()
}

/// Visible fields whose dependency is currently hidden.
pub fn hidden_dependencies<'a>(
    schema: &'a FormSchema,
    responses: &FormResponses,
) -> Vec<&'a FormField> {
    let hidden: Vec<&'a FormField> = schema
        .fields()
        .filter(|field| {
            let Some(condition) = &field.conditional_on else {
                return false;
            };
            if !is_visible(field, responses) {
                return false;
            }
            schema
                .field(condition.field_id.as_str())
                .is_some_and(|dependency| !is_visible(dependency, responses))
        })
        .collect();

    for field in &hidden {
        tracing::debug!(field = %field.id, "field is visible although its dependency is hidden");
    }

    hidden
}
