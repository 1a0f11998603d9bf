//! Widget dispatch for rendering collaborators, plus a plain-text renderer.
//!
//! [`widget_for`] is the single place that maps a [`FieldType`] to the input a UI should draw.
//! Presentation state (open dropdowns, hover) belongs to the UI and is not modelled here.

use crate::schema::{FieldOption, FieldType, FieldWidth, FormField, FormSchema};
use crate::value::{FieldErrors, FormResponses};
use crate::visibility::is_visible;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Email,
    Phone,
    Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceStyle {
    Dropdown,
    RadioGroup,
    CheckboxGroup,
}

/// The input a renderer should draw for a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Widget<'a> {
    Heading,
    TextInput { kind: TextKind, multiline: bool },
    NumberInput { min: Option<f64>, max: Option<f64>, step: Option<f64> },
    Slider { min: f64, max: f64, step: f64 },
    Choice { style: ChoiceStyle, multiple: bool, options: &'a [FieldOption] },
    Toggle,
    FileUpload,
}

/// Scale range used when a `scale` field gives no bounds.
const DEFAULT_SCALE: (f64, f64) = (0.0, 10.0);

pub fn widget_for(field: &FormField) -> Widget<'_> {
    let rules = field.validation.as_ref();
    let min = rules.and_then(|r| r.min);
    let max = rules.and_then(|r| r.max);
    let step = rules.and_then(|r| r.step);

    match field.field_type {
        FieldType::SectionHeader => Widget::Heading,
        FieldType::Text => Widget::TextInput { kind: TextKind::Plain, multiline: false },
        FieldType::Textarea => Widget::TextInput { kind: TextKind::Plain, multiline: true },
        FieldType::Email => Widget::TextInput { kind: TextKind::Email, multiline: false },
        FieldType::Phone => Widget::TextInput { kind: TextKind::Phone, multiline: false },
        FieldType::Date => Widget::TextInput { kind: TextKind::Date, multiline: false },
        FieldType::Number => Widget::NumberInput { min, max, step },
        FieldType::Scale => Widget::Slider {
            min: min.unwrap_or(DEFAULT_SCALE.0),
            max: max.unwrap_or(DEFAULT_SCALE.1),
            step: step.unwrap_or(1.0),
        },
        FieldType::Select => Widget::Choice {
            style: ChoiceStyle::Dropdown,
            multiple: false,
            options: field.options(),
        },
        FieldType::Multiselect => Widget::Choice {
            style: ChoiceStyle::Dropdown,
            multiple: true,
            options: field.options(),
        },
        FieldType::Radio => Widget::Choice {
            style: ChoiceStyle::RadioGroup,
            multiple: false,
            options: field.options(),
        },
        FieldType::Checkbox if field.is_checkbox_group() => Widget::Choice {
            style: ChoiceStyle::CheckboxGroup,
            multiple: true,
            options: field.options(),
        },
        FieldType::Checkbox => Widget::Toggle,
        FieldType::File => Widget::FileUpload,
    }
}

fn describe(widget: &Widget<'_>) -> String {
    match widget {
        Widget::Heading => String::new(),
        Widget::TextInput { kind, multiline } => {
            let base = match kind {
                TextKind::Plain => "text",
                TextKind::Email => "email",
                TextKind::Phone => "phone",
                TextKind::Date => "date",
            };
            if *multiline {
                "long text".to_owned()
            } else {
                base.to_owned()
            }
        }
        Widget::NumberInput { min, max, .. } => match (min, max) {
            (Some(min), Some(max)) => format!("number {min}..{max}"),
            (Some(min), None) => format!("number >= {min}"),
            (None, Some(max)) => format!("number <= {max}"),
            (None, None) => "number".to_owned(),
        },
        Widget::Slider { min, max, .. } => format!("scale {min}..{max}"),
        Widget::Choice { style, options, .. } => {
            let kind = match style {
                ChoiceStyle::Dropdown => "choose",
                ChoiceStyle::RadioGroup => "one of",
                ChoiceStyle::CheckboxGroup => "any of",
            };
            let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            format!("{kind}: {}", values.join(" | "))
        }
        Widget::Toggle => "yes/no".to_owned(),
        Widget::FileUpload => "file".to_owned(),
    }
}

/// Renders the currently visible form as plain text.
///
/// Fields appear in presentation order with their current answer and error, if any. Hidden
/// fields are omitted even when they still hold stale answers.
pub fn render_text(schema: &FormSchema, responses: &FormResponses, errors: &FieldErrors) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", schema.title);
    if let Some(description) = &schema.description {
        let _ = writeln!(out, "{description}");
    }

    for section in &schema.sections {
        out.push('\n');
        if let Some(title) = &section.title {
            let _ = writeln!(out, "## {title}");
        }
        if let Some(description) = &section.description {
            let _ = writeln!(out, "{description}");
        }

        for field in section.ordered_fields() {
            if !is_visible(field, responses) {
                continue;
            }
            let widget = widget_for(field);
            if widget == Widget::Heading {
                let _ = writeln!(out, "### {}", field.label);
                continue;
            }

            let marker = if field.required { " *" } else { "" };
            let width = match field.effective_width() {
                FieldWidth::Full => "",
                FieldWidth::Half => " (1/2)",
                FieldWidth::Third => " (1/3)",
            };
            let _ = writeln!(
                out,
                "- {}{marker} [{}] {{{}}}{width}",
                field.label,
                field.id,
                describe(&widget)
            );
            if let Some(value) = responses.get(field.id.as_str()) {
                let _ = writeln!(out, "    = {value}");
            }
            if let Some(message) = errors.get(field.id.as_str()) {
                let _ = writeln!(out, "    ! {message}");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Condition, FormSection, ValidationRules};
    use crate::value::FormFieldValue;
    use intake_types::FieldId;

    #[test]
    fn checkbox_dispatch_depends_on_options() {
        let single = FormField::new("consent", FieldType::Checkbox, "Consent").expect("valid field");
        assert_eq!(widget_for(&single), Widget::Toggle);

        let group = single
            .clone()
            .with_options(vec![FieldOption::new("Headache", "headache")]);
        assert!(matches!(
            widget_for(&group),
            Widget::Choice { style: ChoiceStyle::CheckboxGroup, multiple: true, options } if options.len() == 1
        ));
    }

    #[test]
    fn scale_defaults_to_zero_to_ten() {
        let pain = FormField::new("pain", FieldType::Scale, "Pain").expect("valid field");
        assert_eq!(widget_for(&pain), Widget::Slider { min: 0.0, max: 10.0, step: 1.0 });

        let custom = pain.with_validation(ValidationRules {
            min: Some(1.0),
            max: Some(5.0),
            ..ValidationRules::default()
        });
        assert_eq!(widget_for(&custom), Widget::Slider { min: 1.0, max: 5.0, step: 1.0 });
    }

    #[test]
    fn render_text_hides_invisible_fields_and_shows_errors() {
        let schema = FormSchema::new(
            "Check-in",
            vec![FormSection::new(
                "Today",
                vec![
                    FormField::new("mood", FieldType::Text, "Mood")
                        .expect("valid field")
                        .required()
                        .with_order(1),
                    FormField::new("mood_detail", FieldType::Textarea, "Why?")
                        .expect("valid field")
                        .with_order(2)
                        .conditional_on(Condition::new(FieldId::new("mood").expect("valid id"), "bad")),
                ],
            )],
        );

        let mut responses = FormResponses::new();
        responses.insert(FieldId::new("mood_detail").expect("valid id"), FormFieldValue::from("stale"));
        let mut errors = FieldErrors::new();
        errors.insert(FieldId::new("mood").expect("valid id"), "Mood is required".into());

        let text = render_text(&schema, &responses, &errors);
        assert!(text.contains("# Check-in"));
        assert!(text.contains("- Mood * [mood] {text}"));
        assert!(text.contains("! Mood is required"));
        assert!(!text.contains("mood_detail"));
        assert!(!text.contains("stale"));
    }
}
