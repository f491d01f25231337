// qaspec/src/commands/export.rs
//
// USE CASE: Import then write back a canonical document. Workspace ids come
// from the project's export settings.

use anyhow::Context;
use std::path::PathBuf;

use qaspec_core::application::{ExportOptions, Exporter};
use qaspec_core::infrastructure::document::{CategoryRecord, load_document, save_document};

use crate::cli::ImportArgs;
use crate::commands::project::{Project, selection};

pub fn execute(
    document_path: PathBuf,
    output: PathBuf,
    args: ImportArgs,
    all_descriptors: bool,
    conditions: bool,
) -> anyhow::Result<()> {
    let project = Project::load(&args, false)?;
    let importer = project.importer();

    println!("📥 Importing {}...", document_path.display());
    let document = load_document(&document_path)?;
    let imported = if conditions {
        importer.import_conditions(&document)
    } else {
        importer.import_specifications(&document, &selection(&args))
    };
    let result =
        imported.with_context(|| format!("Import of {} failed", document_path.display()))?;

    let mut options = ExportOptions::from(&project.config.export);
    options.all_descriptors |= all_descriptors;
    let known_descriptors = if options.all_descriptors {
        importer.import_descriptors(&document)?
    } else {
        Vec::new()
    };

    let exporter = Exporter::new(options, &project.config.export.workspace_ids);
    let exported = if conditions {
        exporter.export_conditions(&result.conditions, &known_descriptors)
    } else {
        exporter.export(&result.specifications, &known_descriptors)
    };

    save_document(&output, &exported)?;

    if !result.misses.is_empty() {
        eprintln!(
            "⚠️  {} dataset(s) not found, affected configurations were left out.",
            result.misses.len()
        );
    }
    println!(
        "✨ Exported {} specification(s), {} condition(s) to {}",
        exported.quality_specifications.len()
            + count_nested(&exported.categories, |c| c.quality_specifications.len()),
        exported.quality_conditions.len()
            + count_nested(&exported.categories, |c| c.quality_conditions.len()),
        output.display()
    );
    Ok(())
}

fn count_nested(categories: &[CategoryRecord], count: fn(&CategoryRecord) -> usize) -> usize {
    categories
        .iter()
        .map(|c| count(c) + count_nested(&c.sub_categories, count))
        .sum()
}
