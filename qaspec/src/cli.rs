// qaspec/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qaspec")]
#[command(about = "Exchange engine for data quality specifications", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command that resolves datasets.
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Project directory (qaspec.yaml, catalog, signatures)
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Skip configurations with unknown datasets instead of failing
    #[arg(long)]
    pub tolerant: bool,

    /// Model for dataset references without a workspace id
    #[arg(long)]
    pub default_model: Option<String>,

    /// Import only these quality specifications (repeatable)
    #[arg(long = "spec", short = 's')]
    pub specifications: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✅ Checks documents for structural errors (names, uuids, cycles)
    Validate {
        /// Document file or directory of documents
        path: PathBuf,
    },

    /// 📥 Imports a document against the project's catalog
    Import {
        /// Exchange document (YAML)
        document: PathBuf,

        #[command(flatten)]
        args: ImportArgs,

        /// Print the import report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 📤 Imports a document and writes it back in canonical form
    Export {
        /// Exchange document (YAML)
        document: PathBuf,

        /// Output document
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        args: ImportArgs,

        /// Write every descriptor of the source document
        #[arg(long)]
        all_descriptors: bool,

        /// Export all quality conditions, not only those of specifications
        #[arg(long)]
        conditions: bool,
    },

    /// 🔍 Lists the fragments of a document
    Inspect {
        /// Exchange document (YAML)
        document: PathBuf,

        /// Only show fragments of this kind (specification, condition, transformer, ...)
        #[arg(long, short)]
        kind: Option<String>,
    },
}
