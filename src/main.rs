use anyhow::Result;
use clap::{Parser, Subcommand};
use ninout_dash::commands::{graph, rows, runs, watch};
use ninout_dash::config::{ConfigOverrides, DashConfig};
use ninout_dash::logging::{init_logging, LogTarget};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ninout-dash")]
#[command(about = "Live dashboard for ninout pipeline runs", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the run API (default: http://127.0.0.1:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: <config dir>/ninout/dash.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Background refresh interval in milliseconds
    #[arg(long, global = true)]
    interval_ms: Option<u64>,

    /// Log file for the live dashboard
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard (default)
    Watch {
        /// Run to select on startup
        #[arg(long)]
        run: Option<String>,

        /// Step to select on startup (requires --run)
        #[arg(long, requires = "run")]
        step: Option<String>,
    },

    /// List runs
    Runs,

    /// Export a run's graph as SVG
    Graph {
        /// Run name
        run: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Step to highlight
        #[arg(long)]
        step: Option<String>,
    },

    /// Print the first row page of a step
    Rows {
        /// Run name
        run: String,

        /// Step name
        step: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        api_url: cli.api_url,
        refresh_interval_ms: cli.interval_ms,
        log_file: cli.log_file,
    };
    let config = DashConfig::load(cli.config.as_deref(), &overrides)?;

    let command = cli.command.unwrap_or(Commands::Watch {
        run: None,
        step: None,
    });

    let log_target = match command {
        Commands::Watch { .. } => config
            .log_file
            .clone()
            .or_else(DashConfig::default_log_file)
            .map_or(LogTarget::Discard, LogTarget::File),
        _ => LogTarget::Stderr,
    };
    init_logging(&log_target)?;
    tracing::debug!(?config, "configuration resolved");

    match command {
        Commands::Watch { run, step } => watch::execute(&config, run, step),
        Commands::Runs => runs::execute(&config),
        Commands::Graph { run, out, step } => {
            graph::execute(&config, &run, out.as_deref(), step.as_deref())
        }
        Commands::Rows { run, step } => rows::execute(&config, &run, &step),
    }
}
