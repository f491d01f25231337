// qaspec/src/commands/import.rs
//
// USE CASE: Import a document against the project's catalog and report
// what was built and what was skipped.

use anyhow::Context;
use std::path::PathBuf;

use qaspec_core::application::{ImportReport, ImportResult};
use qaspec_core::infrastructure::document::load_document;

use crate::cli::ImportArgs;
use crate::commands::project::{Project, selection};

pub fn execute(
    document_path: PathBuf,
    args: ImportArgs,
    json: bool,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let project = Project::load(&args, json)?;

    if !json {
        println!("📥 Importing {}...", document_path.display());
    }
    let document = load_document(&document_path)?;
    let result = project
        .importer()
        .import_specifications(&document, &selection(&args))
        .with_context(|| format!("Import of {} failed", document_path.display()))?;

    let report = ImportReport::new(document_path.display().to_string(), &result);

    if let Some(path) = &report_path {
        report.write(path)?;
        if !json {
            println!("📄 JSON report saved to {}", path.display());
        }
    }

    // JSON mode: stdout carries the report only, diagnostics go to stderr
    if json {
        println!("{}", report.to_json()?);
        print_skips(&result);
        return Ok(());
    }

    println!("📊 Import Summary:");
    println!("   Specifications: {}", report.stats.specifications);
    println!("   Conditions:     {}", report.stats.conditions);
    println!("   Transformers:   {}", report.stats.transformers);
    println!("   Issue filters:  {}", report.stats.issue_filters);

    if result.misses.is_empty() && result.skipped.is_empty() {
        println!("   ✅ All datasets resolved.");
    } else {
        print_skips(&result);
        println!(
            "   Skipped configurations: {}",
            report.stats.skipped_configurations
        );
    }

    Ok(())
}

fn print_skips(result: &ImportResult) {
    if !result.misses.is_empty() {
        eprintln!("\n⚠️  {} dataset(s) not found:", result.misses.len());
        for miss in &result.misses {
            eprintln!(
                "   ❌ {} (workspace {}) in {}.{}",
                miss.dataset,
                miss.workspace_id.as_deref().unwrap_or("-"),
                miss.configuration,
                miss.parameter
            );
        }
    }
    if !result.skipped.is_empty() {
        eprintln!("\n⏭️  {} configuration(s) skipped:", result.skipped.len());
        for skipped in &result.skipped {
            for cause in &skipped.causes {
                eprintln!("   - {} '{}': {}", skipped.kind, skipped.name, cause);
            }
        }
    }
}
