mod config;
mod logging;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use vitalgen_core::{
    Error as CoreError, FieldCatalog, FieldPercentage, SpecifierParser, catalog_document_schema,
};
use vitalgen_generate::catalog::DEFAULT_NAME_POOL_SIZE;
use vitalgen_generate::output::OutputFormat;
use vitalgen_generate::output::sink::{WriterSink, send_all};
use vitalgen_generate::{
    GenerateOptions, GenerationEngine, GenerationError, GenerationRequest, RunRequest,
};

use config::{CliConfig, ConfigError, load_catalog_document};
use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "vitalgen",
    version,
    about = "Synthetic publications and subscriptions for pub/sub matchers"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Seed for every random stream.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Configuration file (defaults to ./vitalgen.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Catalog document (TOML or JSON) replacing the built-in catalog.
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Append JSON logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print random publications.
    Publish(PublishArgs),
    /// Print random subscriptions.
    Subscribe(SubscribeArgs),
    /// Write publications, subscriptions and a report to a run directory.
    Run(RunArgs),
    /// Print the active catalog or the catalog document JSON Schema.
    Catalog(CatalogArgs),
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum FormatArg {
    #[default]
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
struct PublishArgs {
    /// Number of publications.
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: i64,
    #[arg(long, value_enum, default_value_t)]
    format: FormatArg,
    /// Channel name reported to the sink.
    #[arg(long, default_value = "publications")]
    channel: String,
}

#[derive(Args, Debug)]
struct SubscriptionSpecArgs {
    /// Field participation, e.g. `height=50%` (repeatable).
    #[arg(long = "field", value_name = "FIELD=N%")]
    fields: Vec<String>,
    /// Equality share for one field, e.g. `height=70%`.
    #[arg(long, value_name = "FIELD=N%")]
    equality: Option<String>,
}

#[derive(Args, Debug)]
struct SubscribeArgs {
    /// Number of subscriptions.
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: i64,
    #[command(flatten)]
    spec: SubscriptionSpecArgs,
    #[arg(long, value_enum, default_value_t)]
    format: FormatArg,
    /// Channel name reported to the sink.
    #[arg(long, default_value = "subscriptions")]
    channel: String,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Number of publications.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    publications: i64,
    /// Number of subscriptions; omit to skip subscriptions.
    #[arg(long, allow_negative_numbers = true)]
    subscriptions: Option<i64>,
    #[command(flatten)]
    spec: SubscriptionSpecArgs,
    /// Parent directory for run directories.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Print the JSON Schema of catalog documents instead.
    #[arg(long, default_value_t = false)]
    schema: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.global.log_file.as_deref())?;

    let config = CliConfig::load(cli.global.config.as_deref())?;
    let options = GenerateOptions {
        seed: cli
            .global
            .seed
            .or(config.seed)
            .unwrap_or(GenerateOptions::default().seed),
        name_pool_size: config.name_pool_size.unwrap_or(DEFAULT_NAME_POOL_SIZE),
        out_dir: config
            .out_dir
            .clone()
            .unwrap_or_else(|| GenerateOptions::default().out_dir),
    };

    let catalog_path = cli.global.catalog.clone().or_else(|| config.catalog.clone());

    match cli.command {
        Command::Publish(args) => {
            let engine = GenerationEngine::new(options);
            let catalog = load_catalog(&engine, catalog_path)?;
            run_publish(&engine, &catalog, args)
        }
        Command::Subscribe(args) => {
            let engine = GenerationEngine::new(options);
            let catalog = load_catalog(&engine, catalog_path)?;
            run_subscribe(&engine, &catalog, &config, args)
        }
        Command::Run(args) => {
            let options = GenerateOptions {
                out_dir: args.out_dir.clone().unwrap_or(options.out_dir),
                ..options
            };
            let engine = GenerationEngine::new(options);
            let catalog = load_catalog(&engine, catalog_path)?;
            run_generation(&engine, &catalog, &config, args)
        }
        Command::Catalog(args) => {
            if args.schema {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&catalog_document_schema())?
                );
                return Ok(());
            }
            let engine = GenerationEngine::new(options);
            let catalog = load_catalog(&engine, catalog_path)?;
            println!("{}", serde_json::to_string_pretty(&catalog.to_document())?);
            Ok(())
        }
    }
}

fn load_catalog(
    engine: &GenerationEngine,
    path: Option<PathBuf>,
) -> Result<FieldCatalog, CliError> {
    match path {
        Some(path) => {
            let document = load_catalog_document(&path)?;
            let catalog = FieldCatalog::from_document(document)?;
            tracing::info!(path = %path.display(), fields = catalog.len(), "catalog loaded");
            Ok(catalog)
        }
        None => Ok(engine.patient_vitals_catalog()?),
    }
}

fn run_publish(
    engine: &GenerationEngine,
    catalog: &FieldCatalog,
    args: PublishArgs,
) -> Result<(), CliError> {
    let publications = engine.publications(catalog, args.count)?;
    let mut sink = WriterSink::new(io::stdout().lock());
    send_all(&mut sink, &args.channel, &publications, args.format.into())?;
    Ok(())
}

fn run_subscribe(
    engine: &GenerationEngine,
    catalog: &FieldCatalog,
    config: &CliConfig,
    args: SubscribeArgs,
) -> Result<(), CliError> {
    let request = build_request(catalog, config, args.count, args.spec)?;
    let plan = engine.subscriptions(catalog, request)?;
    let mut sink = WriterSink::new(io::stdout().lock());
    send_all(&mut sink, &args.channel, &plan.subscriptions, args.format.into())?;
    Ok(())
}

fn run_generation(
    engine: &GenerationEngine,
    catalog: &FieldCatalog,
    config: &CliConfig,
    args: RunArgs,
) -> Result<(), CliError> {
    let subscriptions = match args.subscriptions {
        Some(count) => Some(build_request(catalog, config, count, args.spec)?),
        None => None,
    };
    let request = RunRequest {
        publications: args.publications,
        subscriptions,
    };

    let result = engine.run(catalog, request)?;
    println!("{}", result.run_dir.display());
    Ok(())
}

/// Resolve specifier tokens (flags first, config file second) into a request.
fn build_request(
    catalog: &FieldCatalog,
    config: &CliConfig,
    count: i64,
    spec: SubscriptionSpecArgs,
) -> Result<GenerationRequest, CliError> {
    if count < 0 {
        return Err(CoreError::InvalidCount(count).into());
    }

    let parser = SpecifierParser::new(catalog)?;
    let fields = if spec.fields.is_empty() {
        config.subscriptions.fields.clone()
    } else {
        spec.fields
    };
    let equality = spec
        .equality
        .or_else(|| config.subscriptions.equality.clone())
        .ok_or_else(|| {
            CliError::InvalidConfig(
                "an equality target is required (--equality FIELD=N%)".to_string(),
            )
        })?;

    let field_percentages: Vec<FieldPercentage> = parser.parse_all(&fields)?;
    let equality_target = parser.parse(&equality)?;

    Ok(GenerationRequest::new(
        count,
        field_percentages,
        equality_target,
    ))
}
