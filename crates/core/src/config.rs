//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the template loader
//! and services. Binaries read environment variables and hand the raw values to
//! [`IntakeConfig::from_env_values`]; nothing in the library reads the environment itself.

use crate::constants::{DEFAULT_REST_ADDR, DEFAULT_SPECIALTY, TEMPLATE_FILE_EXTENSIONS};
use crate::{FormError, FormResult};
use intake_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    template_dir: Option<PathBuf>,
    default_specialty: String,
    rest_addr: String,
}

impl IntakeConfig {
    /// Create a new `IntakeConfig`.
    ///
    /// A template directory, when given, is checked with [`scan_template_dir`].
    pub fn new(
        template_dir: Option<PathBuf>,
        default_specialty: String,
        rest_addr: String,
    ) -> FormResult<Self> {
        let default_specialty = NonEmptyText::new(&default_specialty)
            .map_err(|_| FormError::InvalidInput("default specialty cannot be empty".into()))?;
        let rest_addr = NonEmptyText::new(&rest_addr)
            .map_err(|_| FormError::InvalidInput("REST address cannot be empty".into()))?;

        if let Some(dir) = &template_dir {
            scan_template_dir(dir)?;
        }

        Ok(Self {
            template_dir,
            default_specialty: default_specialty.as_str().to_owned(),
            rest_addr: rest_addr.as_str().to_owned(),
        })
    }

    /// Build a configuration from optional raw environment values.
    ///
    /// Missing or blank values fall back to the defaults in [`crate::constants`].
    pub fn from_env_values(
        template_dir: Option<String>,
        default_specialty: Option<String>,
        rest_addr: Option<String>,
    ) -> FormResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self::new(
            non_blank(template_dir).map(PathBuf::from),
            non_blank(default_specialty).unwrap_or_else(|| DEFAULT_SPECIALTY.into()),
            non_blank(rest_addr).unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
        )
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    pub fn default_specialty(&self) -> &str {
        &self.default_specialty
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            default_specialty: DEFAULT_SPECIALTY.into(),
            rest_addr: DEFAULT_REST_ADDR.into(),
        }
    }
}

/// Upper bound on template documents loaded from one directory.
const MAX_TEMPLATE_FILES: usize = 200;
/// Upper bound on the size of one template document.
const MAX_TEMPLATE_FILE_BYTES: u64 = 256 * 1024;
const MAX_TEMPLATE_DIR_DEPTH: usize = 4;

/// What [`scan_template_dir`] found in an accepted template directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemplateDirSummary {
    /// `*.yaml`/`*.yml` documents the loader will parse.
    pub template_files: usize,
    /// Other regular files, which the loader ignores.
    pub skipped_files: usize,
}

/// Whether the loader treats `path` as a template document.
pub fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_FILE_EXTENSIONS.contains(&ext))
}

/// Checks a template directory before any document in it is parsed.
///
/// Only template documents count against the file-count and per-file size limits; other files
/// are tallied and left alone. Symlinks and special files are rejected anywhere in the tree.
pub fn scan_template_dir(template_dir: &Path) -> FormResult<TemplateDirSummary> {
    if !template_dir.is_dir() {
        return Err(FormError::InvalidInput(format!(
            "template directory does not exist: {}",
            template_dir.display()
        )));
    }

    let mut summary = TemplateDirSummary::default();
    let mut pending = vec![(template_dir.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        for entry in std::fs::read_dir(&dir).map_err(FormError::FileRead)? {
            let entry = entry.map_err(FormError::FileRead)?;
            let path = entry.path();
            // DirEntry::file_type does not follow symlinks.
            let file_type = entry.file_type().map_err(FormError::FileRead)?;

            if file_type.is_symlink() {
                return Err(FormError::InvalidInput(format!(
                    "template directory must not contain symlinks: {}",
                    path.display()
                )));
            }

            if file_type.is_dir() {
                if depth >= MAX_TEMPLATE_DIR_DEPTH {
                    return Err(FormError::InvalidInput(format!(
                        "template directory exceeds maximum nesting depth of {MAX_TEMPLATE_DIR_DEPTH}"
                    )));
                }
                pending.push((path, depth + 1));
            } else if !file_type.is_file() {
                return Err(FormError::InvalidInput(format!(
                    "unsupported file type in template directory: {}",
                    path.display()
                )));
            } else if is_template_file(&path) {
                let len = entry.metadata().map_err(FormError::FileRead)?.len();
                if len > MAX_TEMPLATE_FILE_BYTES {
                    return Err(FormError::InvalidInput(format!(
                        "template {} is larger than {MAX_TEMPLATE_FILE_BYTES} bytes",
                        path.display()
                    )));
                }

                summary.template_files += 1;
                if summary.template_files > MAX_TEMPLATE_FILES {
                    return Err(FormError::InvalidInput(format!(
                        "template directory holds more than {MAX_TEMPLATE_FILES} templates"
                    )));
                }
            } else {
                summary.skipped_files += 1;
            }
        }
    }

    tracing::debug!(
        dir = %template_dir.display(),
        template_files = summary.template_files,
        skipped_files = summary.skipped_files,
        "template directory checked"
    );

    Ok(summary)
}
