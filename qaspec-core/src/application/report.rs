// qaspec-core/src/application/report.rs

use chrono::Utc;
use serde::Serialize;
use std::path::Path;

use crate::application::import::ImportResult;
use crate::application::resolver::{DatasetMiss, SkippedConfiguration};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

// --- DTOs ---
// What `qaspec import --json` prints and what the report file contains.

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub generated_at: String,
    pub source: String,
    pub stats: ImportStats,
    pub specifications: Vec<SpecificationSummary>,
    pub misses: Vec<DatasetMiss>,
    pub skipped: Vec<SkippedConfiguration>,
}

#[derive(Debug, Serialize)]
pub struct ImportStats {
    pub specifications: usize,
    pub conditions: usize,
    pub transformers: usize,
    pub issue_filters: usize,
    pub descriptors: usize,
    pub categories: usize,
    pub skipped_configurations: usize,
}

#[derive(Debug, Serialize)]
pub struct SpecificationSummary {
    pub name: String,
    pub uuid: String,
    pub category: Option<String>,
    pub elements: usize,
    pub enabled: usize,
}

impl ImportReport {
    pub fn new(source: impl Into<String>, result: &ImportResult) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            source: source.into(),
            stats: ImportStats {
                specifications: result.specifications.len(),
                conditions: result.conditions.len(),
                transformers: result.transformers.len(),
                issue_filters: result.issue_filters.len(),
                descriptors: result.descriptors.len(),
                categories: result.categories.len(),
                skipped_configurations: result.skipped.len(),
            },
            specifications: result
                .specifications
                .iter()
                .map(|s| SpecificationSummary {
                    name: s.name.clone(),
                    uuid: s.uuid.to_string(),
                    category: s.category.as_ref().map(|c| c.qualified_name()),
                    elements: s.elements.len(),
                    enabled: s.enabled_conditions().count(),
                })
                .collect(),
            misses: result.misses.clone(),
            skipped: result.skipped.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, InfrastructureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), InfrastructureError> {
        atomic_write(path, self.to_json()?)?;
        Ok(())
    }
}
