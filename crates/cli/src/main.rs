use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::OutputFormat;

/// penguins - configuration and platform wiring for the penguins ML pipeline
#[derive(Parser)]
#[command(name = "penguins")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Named profile to resolve platform values from
  #[arg(long, global = true)]
  profile: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the resolved pipeline configuration and ambient context
  Info {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Validate that the configuration and ambient context resolve
  Check {
    /// Also require the local dataset file to exist
    #[arg(long)]
    data: bool,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Initialize logging
  let default_filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Info { format } => cmd::cmd_info(cli.profile.as_deref(), format),
    Commands::Check { data } => cmd::cmd_check(cli.profile.as_deref(), data),
  }
}
