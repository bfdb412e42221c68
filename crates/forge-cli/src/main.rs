//! Forge CLI - LLM-driven project generation
//!
//! Usage:
//!   forge serve                 Run the HTTP facade
//!   forge generate <prompt>     Run the pipeline directly
//!   forge history               List generated projects
//!   forge init                  Write a default .forge/config.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forge_agent::{AgentClient, Model};
use forge_core::{ForgeConfig, PipelineEvent, PipelineStatus};
use forge_pipeline::Pipeline;
use forge_server::list_history;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about = "LLM-driven project generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the generation pipeline for one prompt
    Generate {
        /// What to build
        prompt: String,

        /// Ceiling on coder invocations
        #[arg(long)]
        max_steps: Option<usize>,

        /// Model to use (opus, sonnet, haiku)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List generated projects, newest first
    History,

    /// Write a default .forge/config.toml in the current directory
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to initialize logging")?;

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let mut config = ForgeConfig::load_or_default(&cwd)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            forge_server::run(config).await
        }
        Commands::Generate {
            prompt,
            max_steps,
            model,
        } => generate(config, &prompt, max_steps, model).await,
        Commands::History => {
            let projects_dir = PathBuf::from(&config.projects_dir);
            let history = list_history(&projects_dir);
            if history.is_empty() {
                println!("No projects yet.");
            } else {
                for entry in history {
                    println!("{}  {}", entry.folder, entry.name);
                }
            }
            Ok(())
        }
        Commands::Init => {
            ForgeConfig::write_default(&cwd)?;
            println!("Wrote .forge/config.toml");
            Ok(())
        }
    }
}

async fn generate(
    config: ForgeConfig,
    prompt: &str,
    max_steps: Option<usize>,
    model: Option<String>,
) -> Result<()> {
    let model: Model = model
        .unwrap_or_else(|| config.model_name())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let client = AgentClient::new(model)
        .with_max_tokens(config.pipeline.max_tokens)
        .with_api_key_env(config.models.api_key_env.clone());

    let pipeline = Pipeline::new(
        client,
        PathBuf::from(&config.projects_dir),
        config.pipeline.clone(),
    );

    // Print progress events as NDJSON while the pipeline runs
    let (tx, mut rx) = tokio::sync::mpsc::channel::<PipelineEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print!("{}", event.to_ndjson());
        }
    });

    let outcome = pipeline.run(prompt, max_steps, Some(tx)).await?;
    printer.await.ok();

    println!(
        "\n{} -> {}",
        outcome.project_name,
        outcome.project_path.display()
    );
    match outcome.status {
        PipelineStatus::Done => println!("All steps completed."),
        PipelineStatus::DoneWithFailures => {
            println!("Completed with skipped files: {}", outcome.failed_steps.join(", "));
        }
        PipelineStatus::InProgress => {}
    }

    Ok(())
}
