mod config;
mod query_args;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doclify_sdk::{Client, InMemoryResponseCache, structured_text};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, CliOverrides, LoggingConfig};
use crate::query_args::QueryArgs;

/// Doclify CLI - query a Doclify repository and render structured text
#[derive(Parser)]
#[command(name = "doclify")]
#[command(about = "Doclify CLI - query a Doclify repository and render structured text")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository slug (overrides config)
    #[arg(long, global = true)]
    repository: Option<String>,

    /// API key (overrides config)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Disable response caching even if configured
    #[arg(long, global = true)]
    no_cache: bool,

    /// Print effective configuration (JSON, token redacted) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search documents
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Maximum number of documents (default 20)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Fetch one page of documents
    Paginate {
        #[command(flatten)]
        query: QueryArgs,

        /// Page number (default 1)
        #[arg(long)]
        page: Option<u32>,

        /// Documents per page (default 20)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Fetch the first matching document
    First {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Render structured text JSON to HTML (`-` reads stdin)
    Render {
        file: PathBuf,

        /// JSON pointer to the structured text inside the file, e.g. /data/body
        #[arg(long)]
        field: Option<String>,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // 1) defaults -> 2) YAML (if provided) -> 3) env (DOCLIFY__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        repository: cli.repository.clone(),
        token: cli.token.clone(),
        base_url: cli.base_url.clone(),
        no_cache: cli.no_cache,
    });

    init_logging(&config.logging, cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Search { query, limit } => {
            let documents = query.apply(build_client(&config)?.documents())?;
            print_json(&documents.fetch(limit).await?)
        }
        Commands::Paginate {
            query,
            page,
            per_page,
        } => {
            let documents = query.apply(build_client(&config)?.documents())?;
            print_json(&documents.paginate(page, per_page).await?)
        }
        Commands::First { query } => {
            let documents = query.apply(build_client(&config)?.documents())?;
            print_json(&documents.first().await?)
        }
        Commands::Render { file, field } => render(&file, field.as_deref()),
        Commands::Check => check_config(&config),
    }
}

fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(config: &AppConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .config(config.client.clone())
        .transport_config(config.http.to_transport_config());

    if let Some(cache) = &config.cache {
        builder = builder.cache(
            Arc::new(InMemoryResponseCache::from_config(cache)),
            cache.clone(),
        );
    }

    Ok(builder.build()?)
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let resolved = config
        .client
        .validate()
        .context("client configuration is invalid")?;

    println!("Configuration is valid");
    println!("repository: {}", resolved.repository);
    println!("base url:   {}", resolved.base_url);
    Ok(())
}

fn render(file: &Path, field: Option<&str>) -> Result<()> {
    let raw = if file == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };
    let document: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;

    let node = match field {
        Some(pointer) => document.pointer(pointer),
        None => Some(&document),
    };
    if node.is_none() {
        tracing::warn!(field = ?field, "field not found, rendering nothing");
    }

    println!("{}", structured_text::as_html(node));
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
