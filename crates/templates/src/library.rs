//! The read-only template catalogue.

use crate::document::TemplateDocument;
use crate::{TemplateError, TemplateResult};
use intake_core::config::is_template_file;
use intake_core::{FormSchema, IntakeConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    ("general.yaml", include_str!("../templates/general.yaml")),
    ("nutrition.yaml", include_str!("../templates/nutrition.yaml")),
    ("psychology.yaml", include_str!("../templates/psychology.yaml")),
];

/// One catalogue entry. The schema is shared with every session started from it.
#[derive(Clone, Debug)]
pub struct TemplateEntry {
    pub key: String,
    pub specialty: String,
    pub schema: Arc<FormSchema>,
}

/// Templates keyed by their slug, iterated in key order.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    entries: BTreeMap<String, TemplateEntry>,
}

impl TemplateLibrary {
    /// The catalogue embedded in this crate.
    ///
    /// # Errors
    ///
    /// Fails only if an embedded template is malformed, which is a build defect.
    pub fn builtin() -> TemplateResult<Self> {
        let mut library = Self::default();
        for (name, text) in BUILTIN_TEMPLATES {
            let document = TemplateDocument::parse_yaml(text).map_err(|err| {
                TemplateError::InvalidInput(format!("built-in template {name} is invalid: {err}"))
            })?;
            library.insert(document)?;
        }
        Ok(library)
    }

    /// Built-in templates plus every template found under the configured directory.
    pub fn load(config: &IntakeConfig) -> TemplateResult<Self> {
        let mut library = Self::builtin()?;
        if let Some(dir) = config.template_dir() {
            let added = library.load_dir(dir)?;
            tracing::info!(dir = %dir.display(), added, "loaded form templates from directory");
        }
        Ok(library)
    }

    /// Loads every `*.yaml`/`*.yml` file below `dir`, in path order. Returns how many were added.
    ///
    /// # Errors
    ///
    /// The first unreadable, invalid or duplicate file aborts the load and the library is left
    /// unchanged.
    pub fn load_dir(&mut self, dir: &Path) -> TemplateResult<usize> {
        let mut paths = Vec::new();
        collect_template_files(dir, &mut paths)?;
        paths.sort();

        let mut staged = self.clone();
        for path in &paths {
            let text = std::fs::read_to_string(path)?;
            let document = TemplateDocument::parse_yaml(&text).map_err(|err| {
                TemplateError::InvalidInput(format!("{}: {err}", path.display()))
            })?;
            tracing::debug!(key = %document.key, path = %path.display(), "parsed template");
            staged.insert(document)?;
        }

        *self = staged;
        Ok(paths.len())
    }

    /// Adds a parsed template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::DuplicateKey` if the key is already present.
    pub fn insert(&mut self, document: TemplateDocument) -> TemplateResult<()> {
        if self.entries.contains_key(&document.key) {
            return Err(TemplateError::DuplicateKey(document.key));
        }
        let entry = TemplateEntry {
            key: document.key.clone(),
            specialty: document.specialty.as_str().to_owned(),
            schema: Arc::new(document.schema),
        };
        self.entries.insert(document.key, entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<FormSchema>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.schema))
    }

    pub fn entry(&self, key: &str) -> Option<&TemplateEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.entries.values()
    }

    pub fn for_specialty<'a>(
        &'a self,
        specialty: &'a str,
    ) -> impl Iterator<Item = &'a TemplateEntry> + 'a {
        self.entries
            .values()
            .filter(move |entry| entry.specialty == specialty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> TemplateResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_template_files(&path, out)?;
        } else if is_template_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{
        validate_form, FieldType, FormFieldValue, FormResponses, FormSession, SubmitOutcome,
    };

    fn responses(pairs: &[(&str, FormFieldValue)]) -> FormResponses {
        pairs
            .iter()
            .map(|(key, value)| (key.parse().expect("valid id"), value.clone()))
            .collect()
    }

    #[test]
    fn builtin_catalogue_has_all_specialties() {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        let keys: Vec<&str> = library.keys().collect();
        assert_eq!(keys, ["general", "nutrition", "psychology"]);

        let nutrition = library.get("nutrition").expect("nutrition");
        assert_eq!(nutrition.title, "Nutrition Intake");
        assert_eq!(library.for_specialty("psychology").count(), 1);
        assert!(library.get("dermatology").is_none());
    }

    #[test]
    fn schemas_are_shared_not_copied() {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        let first = library.get("general").expect("general");
        let second = library.get("general").expect("general");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn psychology_previous_therapy_detail_is_conditional() {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        let schema = library.get("psychology").expect("psychology");

        let detail = schema.field("previous_therapy_detail").expect("detail field");
        assert_eq!(detail.field_type, FieldType::Textarea);
        assert!(!detail.required);

        let hidden = responses(&[
            ("previous_therapy", "no".into()),
            ("previous_therapy_detail", "".into()),
        ]);
        assert!(!intake_core::is_visible(detail, &hidden));
        assert!(!validate_form(&schema, &hidden).contains_key("previous_therapy_detail"));

        let shown = responses(&[("previous_therapy", "yes_stopped".into())]);
        assert!(intake_core::is_visible(detail, &shown));
    }

    #[test]
    fn nutrition_weight_bounds() {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        let schema = library.get("nutrition").expect("nutrition");
        let weight = schema.field("weight_kg").expect("weight field");

        assert_eq!(intake_core::validate_field(weight, Some(&20.into())), None);
        assert_eq!(intake_core::validate_field(weight, Some(&300.into())), None);
        assert!(intake_core::validate_field(weight, Some(&FormFieldValue::Number(19.999))).is_some());
    }

    #[test]
    fn general_template_submits_once_complete() {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        let schema = library.get("general").expect("general");
        let mut submitted = 0;

        let mut session = FormSession::new(schema, |_: &FormResponses| -> Result<(), String> {
            submitted += 1;
            Ok(())
        });
        let SubmitOutcome::Rejected(errors) = session.submit().expect("no handler call") else {
            panic!("expected rejection");
        };
        assert!(errors.contains_key("full_name"));
        assert!(!errors.contains_key("pain_level"));

        for (id, value) in [
            ("full_name", FormFieldValue::from("Ana Souza")),
            ("birth_date", "1990-04-02".into()),
            ("phone", "+55 11 99999-0000".into()),
            ("reason", "Routine check-up".into()),
            ("pain", "no".into()),
        ] {
            session.set_value(id, value).expect("set value");
        }
        assert_eq!(session.submit(), Ok(SubmitOutcome::Submitted));
        drop(session);
        assert_eq!(submitted, 1);
    }

    #[test]
    fn loads_extra_templates_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("dental");
        std::fs::create_dir(&nested).expect("create dir");
        std::fs::write(
            nested.join("dental.yml"),
            "key: dental\nspecialty: dentistry\nschema:\n  title: Dental Intake\n  sections:\n    - fields:\n        - id: last_visit\n          type: date\n          label: Last visit\n",
        )
        .expect("write template");
        std::fs::write(dir.path().join("README.md"), "not a template").expect("write readme");

        let config = IntakeConfig::new(
            Some(dir.path().to_path_buf()),
            "dental".into(),
            "127.0.0.1:0".into(),
        )
        .expect("config");
        let library = TemplateLibrary::load(&config).expect("load templates");

        assert_eq!(library.len(), 4);
        let entry = library.entry("dental").expect("dental entry");
        assert_eq!(entry.specialty, "dentistry");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("general.yaml"),
            "key: general\nspecialty: general\nschema:\n  title: Other\n  sections: []\n",
        )
        .expect("write template");

        let mut library = TemplateLibrary::builtin().expect("builtin templates");
        let err = library.load_dir(dir.path()).expect_err("should reject duplicate");
        assert!(matches!(err, TemplateError::DuplicateKey(key) if key == "general"));
    }

    #[test]
    fn failed_directory_load_leaves_library_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("a-dental.yaml"),
            "key: dental\nspecialty: dentistry\nschema:\n  title: Dental Intake\n  sections: []\n",
        )
        .expect("write template");
        std::fs::write(dir.path().join("b-broken.yaml"), "key: broken\nspecialty: x\n")
            .expect("write template");

        let mut library = TemplateLibrary::builtin().expect("builtin templates");
        library.load_dir(dir.path()).expect_err("should reject broken template");

        assert_eq!(library.len(), 3);
        assert!(library.get("dental").is_none());
    }
}
