// stepcheck CLI
// Author and debug DSL expressions: path segments, matchers, correlation handoff

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stepcheck_core::StepcheckConfig;

use commands::correlate::CorrelateArgs;
use commands::matcher::MatchArgs;
use commands::segments::SegmentsArgs;

/// Inspect and evaluate stepcheck DSL expressions
#[derive(Parser, Debug)]
#[command(name = "stepcheck", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a path expression into segments
    Segments(SegmentsArgs),
    /// Evaluate a matcher expression against a value
    Match(MatchArgs),
    /// Demonstrate a store/find correlation handoff
    Correlate(CorrelateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                color_eyre::eyre::bail!("Config file not found: {}", path.display());
            }
            StepcheckConfig::from_file(path)?
        }
        None => StepcheckConfig::default(),
    };

    match cli.command {
        Command::Segments(args) => commands::segments::execute(args),
        Command::Match(args) => commands::matcher::execute(args),
        Command::Correlate(args) => commands::correlate::execute(args, &config).await,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
