use crate::domain::model::{Dataset, Model};
use std::sync::Arc;

/// Read-only view on the dataset and model catalog.
///
/// Lookups are expected to be synchronous and free of side effects; nothing
/// is written to the catalog while a document is resolved.
pub trait DatasetCatalog: Send + Sync {
    /// Model by name (case-insensitive).
    fn model(&self, name: &str) -> Option<Arc<Model>>;

    /// Every dataset, across all models, whose name matches `name`.
    fn datasets_named(&self, name: &str) -> Vec<Arc<Dataset>>;
}
