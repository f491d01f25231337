// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    /// Catalog of models and datasets (YAML).
    #[serde(default = "default_catalog")]
    #[validate(length(min = 1, message = "Catalog path cannot be empty"))]
    pub catalog: String,

    /// Capability registry: implementation signatures (YAML).
    #[serde(default = "default_signatures")]
    #[validate(length(min = 1, message = "Signatures path cannot be empty"))]
    pub signatures: String,

    #[serde(default)]
    pub import: ImportSettings,

    #[serde(default)]
    #[validate(nested)]
    pub export: ExportSettings,
}

impl ProjectConfig {
    pub fn catalog_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.catalog)
    }

    pub fn signatures_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.signatures)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ImportSettings {
    /// Skip configurations with unknown datasets instead of failing.
    #[serde(default)]
    pub tolerant: bool,

    /// Model used for dataset references without a workspace id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ExportSettings {
    #[serde(default)]
    pub all_descriptors: bool,

    #[serde(default = "default_true")]
    pub metadata: bool,

    #[serde(default = "default_true")]
    pub notes: bool,

    /// Model name -> workspace id written to exported documents.
    #[serde(default)]
    #[validate(custom(function = "validate_workspace_ids"))]
    pub workspace_ids: BTreeMap<String, String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            all_descriptors: false,
            metadata: true,
            notes: true,
            workspace_ids: BTreeMap::new(),
        }
    }
}

fn validate_workspace_ids(
    ids: &BTreeMap<String, String>,
) -> Result<(), validator::ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids.values() {
        if id.trim().is_empty() || !seen.insert(id.to_lowercase()) {
            return Err(validator::ValidationError::new("workspace_ids")
                .with_message("workspace ids must be non-empty and unique".into()));
        }
    }
    Ok(())
}

fn default_catalog() -> String {
    "catalog.yaml".to_string()
}
fn default_signatures() -> String {
    "signatures.yaml".to_string()
}
fn default_true() -> bool {
    true
}
