// qaspec-core/src/infrastructure/document/codec.rs

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::infrastructure::document::legacy::LegacyDocument;
use crate::infrastructure::document::model::DataDictionaryDocument;
use crate::infrastructure::document::version::{SchemaVersion, detect_schema_version};
use crate::infrastructure::error::{FormatError, InfrastructureError};
use crate::infrastructure::fs::{atomic_write, read_text};

/// Parses a document of any supported schema version into the current
/// record set. Fails before anything is resolved.
pub fn parse_document(text: &str) -> Result<DataDictionaryDocument, FormatError> {
    let version = detect_schema_version(text)?;
    debug!(%version, "Detected document schema");

    match version {
        SchemaVersion::Current => serde_yaml::from_str(text).map_err(FormatError::Malformed),
        SchemaVersion::Legacy => {
            let legacy: LegacyDocument =
                serde_yaml::from_str(text).map_err(FormatError::Malformed)?;
            Ok(legacy.into())
        }
    }
}

#[instrument]
pub fn load_document(path: &Path) -> Result<DataDictionaryDocument, InfrastructureError> {
    let text = read_text(path)?;
    let document = parse_document(&text)?;
    info!(
        fragments = document.fragment_count(),
        "Loaded exchange document"
    );
    Ok(document)
}

/// Renders in the current schema. Field order is fixed by the record types,
/// so equal documents render byte-identical.
pub fn render_document(document: &DataDictionaryDocument) -> Result<String, InfrastructureError> {
    Ok(serde_yaml::to_string(document)?)
}

#[instrument(skip(document))]
pub fn save_document(
    path: &Path,
    document: &DataDictionaryDocument,
) -> Result<(), InfrastructureError> {
    let text = render_document(document)?;
    atomic_write(path, text)?;
    info!(path = ?path, "Exchange document written");
    Ok(())
}

/// `path` itself when it is a file, otherwise every `.yaml`/`.yml` file
/// below it, sorted.
pub fn discover_documents(path: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        return Err(InfrastructureError::FileNotFound(path.display().to_string()));
    }

    let mut documents: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    documents.sort();
    Ok(documents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::document::model::{ConfigurationRecord, ParameterValueRecord};
    use crate::infrastructure::document::version::NAMESPACE_CURRENT;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_unknown_namespace_is_a_format_error() {
        let result = parse_document("namespace: urn:esri:dictionary:1.0\n");
        assert!(matches!(result, Err(FormatError::UnsupportedSchema(_))));
    }

    #[test]
    fn test_malformed_record() {
        let result = parse_document("quality_conditions:\n  - descriptor: X\n");
        assert!(matches!(result, Err(FormatError::Malformed(_))));
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dictionary.yaml");

        let mut document = DataDictionaryDocument::default();
        let mut condition = ConfigurationRecord::new("C1", "QaMinLength");
        condition
            .parameters
            .push(ParameterValueRecord::dataset("featureClass", "Roads", Some("WS1")));
        document.quality_conditions.push(condition);

        save_document(&path, &document)?;
        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("namespace:"));
        assert!(text.contains(NAMESPACE_CURRENT));

        let loaded = load_document(&path)?;
        assert_eq!(loaded, document);
        Ok(())
    }

    #[test]
    fn test_discover_documents_sorted() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("nested"))?;
        fs::write(dir.path().join("b.yaml"), "")?;
        fs::write(dir.path().join("nested").join("a.yml"), "")?;
        fs::write(dir.path().join("notes.txt"), "")?;

        let found = discover_documents(dir.path())?;
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.yaml"));
        assert!(found[1].ends_with("nested/a.yml"));
        Ok(())
    }
}
