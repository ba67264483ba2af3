//! meld CLI - inspect and edit routing sessions from the command line.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "meld")]
#[command(author, version, about = "meld routing session CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog units or show one unit's pins
    Units(commands::units::UnitsArgs),

    /// List saved sessions
    Sessions(commands::sessions::SessionsArgs),

    /// Write a new session containing the default I/O units
    New(commands::new::NewArgs),

    /// Add a catalog unit to a session
    Add(commands::add::AddArgs),

    /// Connect (or disconnect) two pins in a session
    Connect(commands::connect::ConnectArgs),

    /// Validate a session file and report every issue
    Check(commands::check::CheckArgs),

    /// Print the execution order of a session
    Plan(commands::plan::PlanArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Units(args) => commands::units::run(args),
        Commands::Sessions(args) => commands::sessions::run(args),
        Commands::New(args) => commands::new::run(args),
        Commands::Add(args) => commands::add::run(args),
        Commands::Connect(args) => commands::connect::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Plan(args) => commands::plan::run(args),
    }
}
