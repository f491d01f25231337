// qaspec/src/main.rs

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug qaspec import ... to see resolution details
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => commands::validate::execute(path),

        Commands::Import {
            document,
            args,
            json,
            report,
        } => commands::import::execute(document, args, json, report),

        Commands::Export {
            document,
            output,
            args,
            all_descriptors,
            conditions,
        } => commands::export::execute(document, output, args, all_descriptors, conditions),

        Commands::Inspect { document, kind } => commands::inspect::execute(document, kind),
    }
}
