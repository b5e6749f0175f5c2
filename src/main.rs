use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use startupai::artifacts::{Exporter, PitchDeckGenerator};
use startupai::models::{AnalysisDimension, BusinessModelDescription, ValidationResult};
use startupai::{server, Config, ExportFormat, HistoryStore, StartupAnalyst};

#[derive(Parser, Debug)]
#[command(name = "startupai")]
#[command(version = "0.1.0")]
#[command(about = "Analyze startup ideas with hosted LLMs")]
struct Args {
    /// Database path for the analysis history (defaults to DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a startup idea
    Analyze {
        /// The idea to analyze
        idea: Option<String>,

        /// Read the idea from a file instead
        #[arg(long, conflicts_with = "idea")]
        file: Option<String>,

        /// Comma-separated dimensions, or "all"
        #[arg(short, long, default_value = "all")]
        dimensions: String,

        /// Output format (json, text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build a pitch deck from a recorded analysis
    Pitch {
        /// Analysis ID (defaults to the most recent)
        #[arg(long)]
        analysis_id: Option<Uuid>,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Critique a business model described in a JSON file
    Validate {
        #[arg(long)]
        business_model: String,
    },

    /// Export a recorded analysis
    Export {
        /// Analysis ID (defaults to the most recent)
        #[arg(long)]
        analysis_id: Option<Uuid>,

        #[arg(short, long, default_value = "markdown")]
        format: String,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// List recorded analyses, newest first
    History,

    /// Run the REST API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("startupai=info".parse()?)
                .add_directive("reqwest=warn".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Command::Analyze {
            idea,
            file,
            dimensions,
            format,
            output,
        } => {
            let idea = match (idea, file) {
                (Some(idea), _) => idea,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read idea from {}", path))?,
                (None, None) => anyhow::bail!("Provide an idea or --file"),
            };
            let dimensions = AnalysisDimension::parse_list(&dimensions)?;
            let format: ExportFormat = format.parse()?;

            let analyst = build_analyst(args.database.as_deref(), true)?;
            let report = analyst.submit_analysis(&idea, &dimensions).await?;
            let rendered = Exporter::new().export(&report, format)?;
            write_output(&rendered, output.as_deref())?;
            eprintln!("Analysis ID: {}", report.request_id());
        }
        Command::Pitch { analysis_id, output } => {
            let history = open_history(args.database.as_deref())?;
            let id = resolve_id(&history, analysis_id)?;
            let deck = PitchDeckGenerator::new().generate(&history.get(id)?)?;
            write_output(&deck.to_markdown(), output.as_deref())?;
        }
        Command::Validate { business_model } => {
            let raw = std::fs::read_to_string(&business_model)
                .with_context(|| format!("Failed to read {}", business_model))?;
            let description: BusinessModelDescription = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid business model JSON object", business_model))?;

            let analyst = build_analyst(args.database.as_deref(), false)?;
            let result = analyst.validate_business_model(&description).await?;
            println!("{}", format_validation(&result));
        }
        Command::Export {
            analysis_id,
            format,
            output,
        } => {
            let history = open_history(args.database.as_deref())?;
            let id = resolve_id(&history, analysis_id)?;
            let rendered = Exporter::new().export(&history.get(id)?, format.parse()?)?;
            write_output(&rendered, output.as_deref())?;
        }
        Command::History => {
            let history = open_history(args.database.as_deref())?;
            let summaries = history.summaries()?;
            if summaries.is_empty() {
                println!("No analyses recorded yet.");
            }
            for summary in summaries {
                println!(
                    "{}  {}  {}/{} ok  {}  {}",
                    summary.request_id,
                    summary.created_at.format("%Y-%m-%d %H:%M"),
                    summary.succeeded,
                    summary.dimensions.len(),
                    summary.outcome,
                    summary.idea_preview
                );
            }
        }
        Command::Serve { host, port } => {
            let config = load_config(args.database.as_deref())?;
            let host = host.unwrap_or_else(|| config.api_host.clone());
            let port = port.unwrap_or(config.api_port);
            let analyst = Arc::new(StartupAnalyst::from_config(&config, false)?);
            server::serve(analyst, &host, port).await?;
        }
    }

    Ok(())
}

fn load_config(database: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(path) = database {
        config.database_path = path.to_string();
    }
    Ok(config)
}

fn build_analyst(database: Option<&str>, show_progress: bool) -> anyhow::Result<StartupAnalyst> {
    let config = load_config(database)?;
    Ok(StartupAnalyst::from_config(&config, show_progress)?)
}

/// History-only commands need no provider keys.
fn open_history(database: Option<&str>) -> anyhow::Result<HistoryStore> {
    let path = database
        .map(str::to_string)
        .or_else(|| std::env::var("DATABASE_PATH").ok())
        .unwrap_or_else(|| "startupai.db".to_string());
    Ok(HistoryStore::new(&path)?)
}

fn resolve_id(history: &HistoryStore, requested: Option<Uuid>) -> anyhow::Result<Uuid> {
    match requested {
        Some(id) => Ok(id),
        None => history
            .latest_id()?
            .context("No analyses recorded yet; run `startupai analyze` first"),
    }
}

fn write_output(content: &str, path: Option<&str>) -> anyhow::Result<()> {
    if let Some(path) = path {
        std::fs::write(path, content)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn format_validation(result: &ValidationResult) -> String {
    let mut output = String::new();
    output.push_str("\n=== Business Model Validation ===\n\n");
    output.push_str(&format!("Verdict: {:?}\n", result.verdict));
    output.push_str(&format!("Provider: {}\n\n", result.provider));
    output.push_str(result.critique.trim());
    output.push('\n');
    output
}
