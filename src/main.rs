//! formbind CLI - bind, validate and render form submissions

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};

use formbind::entity::type_name;
use formbind::{Config, FilterRegistry, FixSuggestion, Form, FormDef, FormError, MemoryViews, Record};

#[derive(Parser)]
#[command(name = "formbind")]
#[command(about = "Bind nested form submissions onto entities")]
#[command(version)]
struct Cli {
    /// Path to a YAML config (templates, form_factory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind submitted data onto an entity and print the entity
    Bind {
        /// Path to the YAML form definition
        #[arg(short, long)]
        form: PathBuf,

        /// Path to the submitted data (JSON object)
        #[arg(short, long)]
        data: PathBuf,

        /// Path to the prior entity state (JSON object)
        #[arg(short, long)]
        entity: Option<PathBuf>,

        /// Only bind these top-level names
        #[arg(short, long, value_delimiter = ',')]
        allow: Vec<String>,
    },

    /// Bind submitted data and run the form validators
    Validate {
        /// Path to the YAML form definition
        #[arg(short, long)]
        form: PathBuf,

        /// Path to the submitted data (JSON object)
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Render one element through its decorator
    Render {
        /// Path to the YAML form definition
        #[arg(short, long)]
        form: PathBuf,

        /// Directory holding *.tpl templates
        #[arg(short, long)]
        templates: PathBuf,

        /// Element name to render
        #[arg(short, long)]
        element: String,

        /// Submitted data used as the element value
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but the outcome is a failure
fn run(cli: Cli) -> Result<bool, FormError> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Bind {
            form,
            data,
            entity,
            allow,
        } => bind_command(&config, &form, &data, entity.as_deref(), &allow),
        Commands::Validate { form, data } => validate_command(&config, &form, &data),
        Commands::Render {
            form,
            templates,
            element,
            data,
        } => render_command(&config, &form, &templates, &element, data.as_deref()),
    }
}

fn load_form(config: &Config, path: &Path) -> Result<Form, FormError> {
    FormDef::from_file(path)?.into_form(FilterRegistry::standard(), config.templates.clone())
}

fn load_object(path: &Path, what: &str) -> Result<Map<String, Value>, FormError> {
    let json = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&json)? {
        Value::Object(map) => Ok(map),
        other => Err(FormError::InvalidData {
            what: what.to_string(),
            found: type_name(&other).to_string(),
        }),
    }
}

fn bind_command(
    config: &Config,
    form_path: &Path,
    data_path: &Path,
    entity_path: Option<&Path>,
    allow: &[String],
) -> Result<bool, FormError> {
    let mut form = load_form(config, form_path)?;
    let data = load_object(data_path, "data")?;
    let mut record = match entity_path {
        Some(path) => Record::from_value(Value::Object(load_object(path, "entity")?))?,
        None => Record::new(),
    };

    let allow_list = (!allow.is_empty()).then_some(allow);
    form.bind(&data, &mut record, allow_list);

    println!("{}", serde_json::to_string_pretty(&record.to_value())?);
    Ok(true)
}

fn validate_command(config: &Config, form_path: &Path, data_path: &Path) -> Result<bool, FormError> {
    let mut form = load_form(config, form_path)?;
    let data = load_object(data_path, "data")?;

    let mut record = Record::new();
    form.bind(&data, &mut record, None);

    if form.is_valid()? {
        println!("{} Submission is valid ({} elements)", "✓".green(), form.len());
        return Ok(true);
    }

    println!("{} Submission is invalid", "✗".red());
    for message in form.messages() {
        println!("  {} {}", format!("{}:", message.field).yellow(), message.text);
    }
    Ok(false)
}

fn render_command(
    config: &Config,
    form_path: &Path,
    templates: &Path,
    element: &str,
    data_path: Option<&Path>,
) -> Result<bool, FormError> {
    let mut form = load_form(config, form_path)?;
    if let Some(path) = data_path {
        let data = load_object(path, "data")?;
        form.bind(&data, &mut Record::new(), None);
    }

    let mut views = MemoryViews::from_dir(templates)?;
    let html = form.render(element, &Map::new(), &mut views)?;
    println!("{html}");
    Ok(true)
}
