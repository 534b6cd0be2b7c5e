mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{import::ImportArgs, list::ListArgs, schema::SchemaArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "treeimport", about = "Import row-store trees into Parquet field-trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one tree into a field-tree of a destination directory
    Import(ImportArgs),
    /// Print the field schema a tree translates to
    Schema(SchemaArgs),
    /// List trees of a row-store file or field-trees of a destination directory
    List(ListArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import(args) => args.run(),
        Commands::Schema(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}
