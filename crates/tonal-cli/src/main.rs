//! Tonal CLI - command-line interface for the tonal sound engine.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonal")]
#[command(author, version, about = "Tonal sound engine CLI", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Play into a simulated device instead of the sound card
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List note names and their frequencies
    Notes(commands::notes::NotesArgs),

    /// Play a single tone
    Play(commands::play::PlayArgs),

    /// Play clips back to back
    Sequence(commands::sequence::SequenceArgs),

    /// Render clips to a WAV file
    Render(commands::render::RenderArgs),

    /// Build, inspect or play from the persisted sound bank
    Bank(commands::bank::BankArgs),

    /// Demo sweeps over instruments, pitches and strengths
    Cycle(commands::cycle::CycleArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::common::Context::load(cli.config.as_deref(), cli.dry_run)?;

    match cli.command {
        Commands::Notes(args) => commands::notes::run(args),
        Commands::Play(args) => commands::play::run(&ctx, args),
        Commands::Sequence(args) => commands::sequence::run(&ctx, args),
        Commands::Render(args) => commands::render::run(&ctx, args),
        Commands::Bank(args) => commands::bank::run(&ctx, args),
        Commands::Cycle(args) => commands::cycle::run(&ctx, args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
