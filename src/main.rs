use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chorus::catalog::{builtin_catalog, CatalogManifest, Category};
use chorus::{Config, Orchestrator, Request};

#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "Capability provider orchestration runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a single request and print the synthesized response
    Ask {
        #[arg(help = "Request text")]
        text: String,
        #[arg(long, default_value = "cli")]
        session: String,
        #[arg(long, help = "Request type hint, e.g. creative or technical")]
        hint: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Initialize and print the registry snapshot
    Status {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the provider catalog grouped by category
    Catalog {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            text,
            session,
            hint,
            config,
        } => ask(&text, &session, hint, config).await?,
        Commands::Status { config } => status(config).await?,
        Commands::Catalog { config } => catalog(config)?,
    }

    Ok(())
}

async fn ask(text: &str, session: &str, hint: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let orchestrator = Orchestrator::new(Config::load(config.as_deref())?)?;
    orchestrator.initialize().await?;

    let mut request = Request::new(text);
    if let Some(hint) = hint {
        request = request.with_hint(hint);
    }

    let response = orchestrator.handle_request(session, request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    orchestrator.shutdown().await;
    Ok(())
}

async fn status(config: Option<PathBuf>) -> Result<()> {
    let orchestrator = Orchestrator::new(Config::load(config.as_deref())?)?;
    orchestrator.initialize().await?;

    println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);

    orchestrator.shutdown().await;
    Ok(())
}

fn catalog(config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let mut catalog = builtin_catalog();
    if let Some(path) = &config.manifest_path {
        catalog.extend(CatalogManifest::from_file(path)?.into_catalog());
    }

    for category in Category::ALL {
        let descriptors = catalog.in_category(category);
        if descriptors.is_empty() {
            continue;
        }
        println!("{} (load priority {})", category, category.load_priority());
        for descriptor in descriptors {
            println!("  {:<20} priority {}", descriptor.name, descriptor.priority);
        }
    }

    Ok(())
}
