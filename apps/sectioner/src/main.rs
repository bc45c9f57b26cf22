use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sectioner::errors::error_body;
use sectioner::{
    BatchRunner, Classification, Document, EngineContext, EngineError, ItemStatement, Settings,
    TimeRangedRecord, TABLES_VERSION,
};

#[derive(Parser)]
#[command(name = "sectioner", version, about = "Classify document sections and derive item usage over time")]
struct Cli {
    /// JSON file replacing any subset of the built-in tables.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one document `{sections, categories}` or an array of them.
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Years used / last used per statement from `{statements, records}`.
    Usage {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to the current UTC year.
        #[arg(long)]
        current_year: Option<i32>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyInput {
    One(Document),
    Many(Vec<Document>),
}

#[derive(Serialize)]
#[serde(untagged)]
enum ClassifyOutput {
    One(Classification),
    Many(Vec<Classification>),
}

#[derive(Deserialize)]
struct UsageInput {
    statements: Vec<ItemStatement>,
    records: Vec<TimeRangedRecord>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let body = match e.downcast_ref::<EngineError>() {
            Some(engine) => engine.to_json(),
            None => error_body("INTERNAL_ERROR", &format!("{e:#}")),
        };
        println!("{body:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load settings first (fails fast on malformed env vars)
    let settings = Settings::from_env()?;
    let cli = Cli::parse();

    // Initialize structured logging; stdout is reserved for JSON output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &settings.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting sectioner v{} (tables {TABLES_VERSION})", env!("CARGO_PKG_VERSION"));

    let config = settings.engine_config(cli.tables.as_deref())?;
    let context = Arc::new(EngineContext::new(config)?);
    let runner = BatchRunner::new(
        context,
        settings.max_workers,
        settings.document_timeout,
    );

    let output = match cli.command {
        Command::Classify { input } => {
            let output = match read_json::<ClassifyInput>(&input).await? {
                ClassifyInput::One(document) => {
                    let mut results = runner.classify_all(vec![document]).await?;
                    ClassifyOutput::One(results.pop().unwrap_or_default())
                }
                ClassifyInput::Many(documents) => {
                    ClassifyOutput::Many(runner.classify_all(documents).await?)
                }
            };
            serde_json::to_string_pretty(&output)?
        }
        Command::Usage {
            input,
            current_year,
        } => {
            let UsageInput {
                statements,
                records,
            } = read_json(&input).await?;
            let current_year = current_year.unwrap_or_else(|| chrono::Utc::now().year());
            let report = runner
                .analyze_usage(statements, records, current_year)
                .await?;
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{output}");
    Ok(())
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid input JSON in '{}'", path.display()))
}
