//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "mel-am")]
#[command(about = "Acoustic model inspection and unit lookup")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a model and print its statistics
    Info(crate::info::Args),

    /// Resolve a unit to the nearest HMM
    Lookup(crate::lookup::Args),
}

/// Where to look for the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ModelSource {
    /// Local directory if it exists, else the Hugging Face API
    #[default]
    Auto,
    /// Local directory
    Path,
    /// Hugging Face cache only
    Cache,
    /// Hugging Face API
    Api,
}

/// Model location arguments shared by every subcommand.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Model directory or Hugging Face repository id
    pub model_id: String,

    /// Model source
    #[arg(long = "source", value_enum, default_value_t = ModelSource::Auto)]
    pub model_source: ModelSource,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Info(args) => crate::info::execute(args.try_into()?),
        Commands::Lookup(args) => crate::lookup::execute(args.try_into()?),
    }
}
