//! CLI application for HealthNav.

mod assistant;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ask, batch, config, history, profile, scan, Context};

/// HealthNav - Extract values from blood reports and nutrition labels
#[derive(Parser)]
#[command(name = "healthnav")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User whose profile and history are used
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Directory holding profiles and saved reports
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a single document
    Scan(scan::ScanArgs),

    /// Scan multiple documents
    Batch(batch::BatchArgs),

    /// Ask the health assistant a question
    Ask(ask::AskArgs),

    /// Manage the health questionnaire profile
    Profile(profile::ProfileArgs),

    /// Browse saved reports
    History(history::HistoryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = Context::load(cli.config, cli.user, cli.data_dir)?;

    match cli.command {
        Commands::Scan(args) => scan::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
        Commands::Profile(args) => profile::run(args, &ctx),
        Commands::History(args) => history::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
