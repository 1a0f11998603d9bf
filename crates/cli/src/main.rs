use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_core::constants::{DEFAULT_SPECIALTY_ENV, REST_ADDR_ENV, TEMPLATE_DIR_ENV};
use intake_core::render::render_text;
use intake_core::value::responses_from_json;
use intake_core::{FieldErrors, FormResponses, FormSchema, FormSession, IntakeConfig, SubmitOutcome};
use intake_templates::TemplateLibrary;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Clinical intake form templates CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available form templates
    List,
    /// Print a template as plain text
    Show {
        /// Template key (defaults to the first template of the default specialty)
        key: Option<String>,
        /// JSON file with answers to fill in
        #[arg(long)]
        responses: Option<PathBuf>,
    },
    /// Validate a JSON file of answers against a template and submit it
    Validate {
        /// Template key
        key: String,
        /// JSON file with answers
        responses: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("intake=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = IntakeConfig::from_env_values(
        std::env::var(TEMPLATE_DIR_ENV).ok(),
        std::env::var(DEFAULT_SPECIALTY_ENV).ok(),
        std::env::var(REST_ADDR_ENV).ok(),
    )?;
    let library = TemplateLibrary::load(&cfg)?;

    match cli.command {
        Some(Commands::List) => {
            for entry in library.entries() {
                println!(
                    "{:<16} {:<14} {}",
                    entry.key, entry.specialty, entry.schema.title
                );
            }
        }
        Some(Commands::Show { key, responses }) => {
            let key = match key {
                Some(key) => key,
                None => library
                    .for_specialty(cfg.default_specialty())
                    .next()
                    .map(|entry| entry.key.clone())
                    .with_context(|| {
                        format!("no template for specialty {}", cfg.default_specialty())
                    })?,
            };
            let schema = schema_for(&library, &key)?;
            let responses = match responses {
                Some(path) => read_responses(&path)?,
                None => FormResponses::new(),
            };
            print!("{}", render_text(&schema, &responses, &FieldErrors::new()));
        }
        Some(Commands::Validate { key, responses }) => {
            let schema = schema_for(&library, &key)?;
            let seed = read_responses(&responses)?;

            let mut session = FormSession::with_responses(
                schema,
                seed,
                |answers: &FormResponses| -> Result<(), serde_json::Error> {
                    println!("{}", serde_json::to_string_pretty(answers)?);
                    Ok(())
                },
            );

            match session.submit()? {
                SubmitOutcome::Submitted => {
                    tracing::info!(key = %key, "responses submitted");
                }
                SubmitOutcome::Rejected(errors) => {
                    for (field_id, message) in &errors {
                        eprintln!("{field_id}: {message}");
                    }
                    anyhow::bail!("{} field(s) failed validation", errors.len());
                }
            }
        }
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(())
}

fn schema_for(library: &TemplateLibrary, key: &str) -> anyhow::Result<Arc<FormSchema>> {
    library
        .get(key)
        .with_context(|| format!("unknown template: {key}"))
}

fn read_responses(path: &Path) -> anyhow::Result<FormResponses> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(responses_from_json(&text)?)
}
