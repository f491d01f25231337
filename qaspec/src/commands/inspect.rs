// qaspec/src/commands/inspect.rs
//
// USE CASE: Table view of the fragments of a document (kind, name,
// category, descriptor, parameters). No catalog needed.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;

use qaspec_core::application::DocumentIndex;
use qaspec_core::infrastructure::document::{ConfigurationRecord, load_document};

pub fn execute(document_path: PathBuf, kind: Option<String>) -> anyhow::Result<()> {
    let document = load_document(&document_path)?;
    let index = DocumentIndex::new(&document);
    let wanted = kind.map(|k| k.trim().to_lowercase());
    let shown = |k: &str| wanted.as_deref().is_none_or(|w| k.starts_with(w));

    println!("\n🔍 Inspecting Document: '{}'", document_path.display());
    println!("   Namespace: {}", document.namespace);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kind", "Name", "Category", "Descriptor", "Details"]);

    let category_of = |id: Option<usize>| {
        id.map(|id| index.category(id).qualified_name.clone())
            .unwrap_or_default()
    };

    if shown("specification") {
        for spec in index.specifications() {
            table.add_row(vec![
                "specification".to_string(),
                spec.record.name.clone(),
                category_of(spec.category),
                String::new(),
                format!("{} element(s)", spec.record.elements.len()),
            ]);
        }
    }

    let configurations = [
        ("condition", index.conditions()),
        ("transformer", index.transformers()),
        ("issue_filter", index.issue_filters()),
    ];
    for (label, list) in configurations {
        if !shown(label) {
            continue;
        }
        for located in list {
            table.add_row(vec![
                label.to_string(),
                located.record.name.clone(),
                category_of(located.category),
                located.record.descriptor.clone(),
                parameter_summary(located.record),
            ]);
        }
    }

    if shown("workspace") {
        for workspace in index.workspaces() {
            table.add_row(vec![
                "workspace".to_string(),
                workspace.id.clone(),
                String::new(),
                String::new(),
                format!("model {}", workspace.model_name),
            ]);
        }
    }

    println!("{table}");
    println!(
        "📊 {} fragment(s), {} categor(y/ies)",
        document.fragment_count(),
        index.categories().len()
    );
    Ok(())
}

fn parameter_summary(record: &ConfigurationRecord) -> String {
    let mut parts: Vec<String> = record
        .parameters
        .iter()
        .map(|p| match p.transformer() {
            Some(transformer) => format!("{} <- {}", p.parameter(), transformer),
            None => p.parameter().to_string(),
        })
        .collect();
    if let Some(expression) = &record.issue_filter_expression {
        parts.push(format!("filters: {}", expression));
    }
    parts.join(", ")
}
