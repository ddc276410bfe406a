//! agentwatch: detect and replace ECS instances whose agent stopped
//! reporting.
//!
//! # Usage
//!
//! ```text
//! agentwatch run --cluster staging1 --fail-after 2 --notify-channel ops-alerts
//! agentwatch watch --event event.json --interval 60
//! agentwatch scan --cluster staging1
//! agentwatch counters list
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use commands::EventArgs;

#[derive(Parser)]
#[command(
    name = "agentwatch",
    about = "agentwatch: terminate cluster instances whose agent stopped heartbeating",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to agentwatch.toml. Built-in defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single monitoring pass.
    Run {
        #[command(flatten)]
        event: EventArgs,
    },
    /// Run passes one after another until interrupted.
    Watch {
        #[command(flatten)]
        event: EventArgs,
        /// Seconds to wait after a pass finishes before starting the next.
        #[arg(long, default_value = "60")]
        interval: u64,
    },
    /// List disconnected instances and their autoscaling group. Read-only.
    Scan {
        /// Cluster to scan.
        #[arg(long)]
        cluster: String,
    },
    /// Inspect or reset failure counters.
    Counters {
        #[command(subcommand)]
        action: CountersAction,
    },
}

#[derive(Subcommand)]
enum CountersAction {
    /// List tracked instances and their consecutive failures.
    List,
    /// Forget the counter for one instance.
    Reset { instance_id: String },
    /// Forget every counter.
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,agentwatch=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { event } => commands::run::run(&config, event).await,
        Commands::Watch { event, interval } => commands::run::watch(&config, event, interval).await,
        Commands::Scan { cluster } => commands::scan::scan(&config, &cluster).await,
        Commands::Counters { action } => match action {
            CountersAction::List => commands::counters::list(&config),
            CountersAction::Reset { instance_id } => commands::counters::reset(&config, &instance_id),
            CountersAction::Clear => commands::counters::clear(&config),
        },
    }
}
