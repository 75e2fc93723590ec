//! namecheck - classify names and evaluate models
//!
//! Usage:
//!   namecheck check "Aisha Khan" --model gpt-4.1-mini
//!   namecheck check "m.ahmed" --precheck-only
//!   namecheck eval --dataset test_names.csv --model gpt-4.1 --model gpt-4o-mini

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use namecheck_runtime::{NameClassifier, OpenAiProvider, RuntimeConfig};

mod check;
mod eval;

use eval::{EvalSettings, Evaluator};

#[derive(Parser)]
#[command(name = "namecheck")]
#[command(about = "Realistic-name classification tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single name
    Check {
        /// Name to classify
        name: String,

        /// Remote model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Stop after the local rules; no remote call
        #[arg(long)]
        precheck_only: bool,

        /// Runtime configuration file (YAML)
        #[arg(short, long, env = "NAMECHECK_RUNTIME_CONFIG")]
        config: Option<PathBuf>,

        /// Base URL of the OpenAI-compatible API
        #[arg(long, env = "OPENAI_BASE_URL")]
        base_url: Option<String>,
    },

    /// Measure model accuracy on a labeled dataset via a running server
    Eval {
        /// CSV with Name and Is_Valid columns
        #[arg(short, long)]
        dataset: PathBuf,

        /// Predict endpoint
        #[arg(short, long, default_value = "http://localhost:5000/predict")]
        endpoint: String,

        /// Model to evaluate (repeatable)
        #[arg(short, long = "model", default_values = ["gpt-4.1-mini", "gpt-4o-mini"])]
        models: Vec<String>,

        /// Requests in flight
        #[arg(short, long, default_value = "20")]
        workers: usize,

        /// Attempts per name, including the first
        #[arg(long, default_value = "3")]
        attempts: usize,

        /// Wait between attempts
        #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
        retry_delay: Duration,

        /// Per-request timeout
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        timeout: Duration,

        /// Report file
        #[arg(short, long, default_value = "model_comparison_results.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Check {
            name,
            model,
            precheck_only,
            config,
            base_url,
        } => {
            let outcome = if precheck_only {
                check::check_local(&name)
            } else {
                let classifier = build_classifier(config, base_url)?;
                check::check_remote(&classifier, &name, model.as_deref()).await
            };

            println!("{}", serde_json::to_string_pretty(&outcome.body)?);
            Ok(if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Eval {
            dataset,
            endpoint,
            models,
            workers,
            attempts,
            retry_delay,
            timeout,
            output,
        } => {
            let rows = eval::load_dataset(&dataset)
                .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
            info!("Loaded dataset with {} names", rows.len());

            let evaluator = Evaluator::new(EvalSettings {
                endpoint,
                workers,
                attempts,
                retry_delay,
                timeout,
            })?;
            let report = evaluator.run(&rows, &models).await;

            println!("\n{}", report.comparison_table(&models));
            report
                .write_to(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Detailed results saved to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_classifier(config: Option<PathBuf>, base_url: Option<String>) -> Result<NameClassifier> {
    let config = match config {
        Some(path) => RuntimeConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    let mut provider =
        OpenAiProvider::from_env().context("OPENAI_API_KEY must be set to a non-empty value")?;
    if let Some(url) = base_url {
        provider = provider.with_base_url(url);
    }

    Ok(NameClassifier::new(Arc::new(provider), config)?)
}

fn init_logger(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("namecheck=debug,namecheck_runtime=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("namecheck=info,namecheck_runtime=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
