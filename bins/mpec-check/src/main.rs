mod commands;
mod config;
mod engine;
mod error;
mod evaluator;
mod executor;
mod extractor;
mod probe;


use anyhow::Result;
use clap::{Parser, Subcommand};
use mpec_check_common::types::SolverBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mpec-check")]
#[command(about = "Solve MPEC example problems through the modeling tool and check objectives against reference results", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios and compare results with references
    Run {
        /// Scenario table
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Only run these problems (repeatable)
        #[arg(short, long)]
        problem: Vec<String>,

        /// Only run this solver backend (glpk, cplex)
        #[arg(short, long, value_parser = parse_backend)]
        backend: Option<SolverBackend>,

        /// Write a JSON report here
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List configured scenarios
    List {
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Show which scenarios can run on this host
    Probe {
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Compare an existing result file with a reference file
    Compare {
        #[arg(long)]
        reference: PathBuf,

        #[arg(long)]
        result: PathBuf,

        /// Decimal places that must agree
        #[arg(long, default_value_t = mpec_check_common::config::DEFAULT_PLACES)]
        places: u32,
    },
}

fn parse_backend(s: &str) -> Result<SolverBackend, String> {
    SolverBackend::from_str(s).ok_or_else(|| format!("unknown backend '{}' (expected glpk or cplex)", s))
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let success = match cli.command {
        Commands::Run {
            config,
            problem,
            backend,
            report,
        } => commands::run(&config, &problem, backend, report.as_deref()).await?,
        Commands::List { config } => {
            commands::list(&config)?;
            true
        }
        Commands::Probe { config } => {
            commands::probe(&config)?;
            true
        }
        Commands::Compare {
            reference,
            result,
            places,
        } => commands::compare(&reference, &result, places)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
