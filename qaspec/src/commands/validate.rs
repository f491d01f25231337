// qaspec/src/commands/validate.rs
//
// USE CASE: Structural check of exchange documents, no catalog needed.

use std::path::PathBuf;

use qaspec_core::application::validate_document;
use qaspec_core::infrastructure::document::{discover_documents, load_document};

pub fn execute(path: PathBuf) -> anyhow::Result<()> {
    let documents = discover_documents(&path)?;
    if documents.is_empty() {
        anyhow::bail!("❌ No documents found in {}", path.display());
    }

    println!("🔎 Validating {} document(s)...", documents.len());

    let mut failures = 0;
    for document_path in &documents {
        let result = load_document(document_path)
            .map_err(miette::Report::new)
            .and_then(|document| {
                validate_document(&document).map_err(miette::Report::new)?;
                Ok(document.fragment_count())
            });

        match result {
            Ok(fragments) => {
                println!("   ✅ {} ({} fragments)", document_path.display(), fragments);
            }
            Err(report) => {
                failures += 1;
                // Debug output renders code and help
                eprintln!("   ❌ {}\n{:?}", document_path.display(), report);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} document(s) invalid", failures, documents.len());
    }
    println!("✨ All documents are valid.");
    Ok(())
}
