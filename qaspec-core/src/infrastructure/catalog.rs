// qaspec-core/src/infrastructure/catalog.rs

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::model::{Dataset, DatasetType, GeometryType, Model, name_key};
use crate::domain::ports::DatasetCatalog;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_text;

// --- FILE FORMAT ---

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
    #[serde(default)]
    datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    name: String,
    #[serde(rename = "type", default)]
    dataset_type: DatasetType,
    #[serde(default)]
    geometry: Option<GeometryType>,
}

/// Models and their datasets, read from a YAML file.
///
/// ```yaml
/// models:
///   - name: Model1
///     datasets:
///       - { name: Roads, type: vector, geometry: polyline }
/// ```
#[derive(Debug, Default)]
pub struct YamlCatalog {
    models: Vec<Arc<Model>>,
}

impl YamlCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        Self {
            models: models.into_iter().map(Arc::new).collect(),
        }
    }

    #[instrument]
    pub fn load(path: &Path) -> Result<Self, InfrastructureError> {
        let text = read_text(path)?;
        let catalog = Self::from_yaml(&text)?;
        info!(
            models = catalog.models.len(),
            datasets = catalog.dataset_count(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_yaml(text: &str) -> Result<Self, InfrastructureError> {
        let file: CatalogFile = serde_yaml::from_str(text)?;

        let mut models = Vec::with_capacity(file.models.len());
        for entry in file.models {
            if models
                .iter()
                .any(|m: &Model| name_key(&m.name) == name_key(&entry.name))
            {
                return Err(InfrastructureError::ConfigError(format!(
                    "Duplicate model '{}' in catalog",
                    entry.name
                )));
            }
            let mut model = Model::new(entry.name);
            for dataset in entry.datasets {
                model.add_dataset(dataset.name, dataset.dataset_type, dataset.geometry);
            }
            models.push(model);
        }
        Ok(Self::new(models))
    }

    pub fn models(&self) -> &[Arc<Model>] {
        &self.models
    }

    pub fn dataset_count(&self) -> usize {
        self.models.iter().map(|m| m.datasets().len()).sum()
    }
}

impl DatasetCatalog for YamlCatalog {
    fn model(&self, name: &str) -> Option<Arc<Model>> {
        self.models
            .iter()
            .find(|m| name_key(&m.name) == name_key(name))
            .cloned()
    }

    fn datasets_named(&self, name: &str) -> Vec<Arc<Dataset>> {
        self.models
            .iter()
            .filter_map(|m| m.dataset_by_name(name.trim()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    const CATALOG: &str = r#"
models:
  - name: Model1
    datasets:
      - { name: Roads, type: vector, geometry: polyline }
      - { name: Owners, type: table }
  - name: DefaultModel
    datasets:
      - { name: Roads, geometry: polyline }
"#;

    #[test]
    fn test_lookup_by_model_and_name() -> Result<()> {
        let catalog = YamlCatalog::from_yaml(CATALOG)?;
        assert_eq!(catalog.dataset_count(), 3);

        let model = catalog.model("model1").unwrap();
        let owners = model.dataset_by_name("owners").unwrap();
        assert_eq!(owners.dataset_type, DatasetType::Table);
        assert!(owners.geometry_type.is_none());

        assert_eq!(catalog.datasets_named("Roads").len(), 2);
        assert!(catalog.datasets_named("Rivers").is_empty());
        assert!(catalog.model("Model9").is_none());
        Ok(())
    }

    #[test]
    fn test_model_lookup_shares_instances() -> Result<()> {
        let catalog = YamlCatalog::from_yaml(CATALOG)?;
        let first = catalog.model("Model1").unwrap();
        let second = catalog.model("MODEL1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let text = "models:\n  - name: M\n  - name: m\n";
        assert!(matches!(
            YamlCatalog::from_yaml(text),
            Err(InfrastructureError::ConfigError(_))
        ));
    }
}
