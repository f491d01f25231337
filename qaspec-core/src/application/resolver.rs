// qaspec-core/src/application/resolver.rs

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::model::{Dataset, FragmentKind, Model, name_key};
use crate::domain::ports::DatasetCatalog;

/// Workspace id -> model for one conversion. The empty id stands for the
/// default model.
#[derive(Debug, Default, Clone)]
pub struct ModelsByWorkspaceId {
    models: HashMap<String, Arc<Model>>,
    default_model: Option<Arc<Model>>,
}

impl ModelsByWorkspaceId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, workspace_id: &str, model: Arc<Model>) {
        if workspace_id.trim().is_empty() {
            self.default_model = Some(model);
        } else {
            self.models.insert(name_key(workspace_id), model);
        }
    }

    pub fn get(&self, workspace_id: &str) -> Option<&Arc<Model>> {
        if workspace_id.trim().is_empty() {
            self.default_model.as_ref()
        } else {
            self.models.get(&name_key(workspace_id))
        }
    }

    pub fn default_model(&self) -> Option<&Arc<Model>> {
        self.default_model.as_ref()
    }

    pub fn len(&self) -> usize {
        self.models.len() + usize::from(self.default_model.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dataset reference that could not be resolved in tolerant mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetMiss {
    pub dataset: String,
    pub workspace_id: Option<String>,
    pub configuration: String,
    pub parameter: String,
    /// Set when the parameter is a constructor parameter and the owning
    /// configuration was skipped.
    pub drops_configuration: bool,
}

/// What made a configuration drop out of a tolerant import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkipCause {
    Dataset {
        parameter: String,
        dataset: String,
        workspace_id: Option<String>,
    },
    Transformer {
        parameter: String,
        transformer: String,
    },
    IssueFilter {
        issue_filter: String,
    },
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset {
                parameter,
                dataset,
                workspace_id,
            } => match workspace_id {
                Some(ws) => write!(f, "{parameter}: dataset '{dataset}' (workspace {ws}) not found"),
                None => write!(f, "{parameter}: dataset '{dataset}' not found"),
            },
            Self::Transformer {
                parameter,
                transformer,
            } => write!(f, "{parameter}: transformer '{transformer}' was skipped"),
            Self::IssueFilter { issue_filter } => {
                write!(f, "issue filter '{issue_filter}' was skipped")
            }
        }
    }
}

/// A configuration left out of a tolerant import, with every cause found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedConfiguration {
    pub kind: FragmentKind,
    pub name: String,
    pub causes: Vec<SkipCause>,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Found(Arc<Dataset>),
    Missing(DatasetMiss),
}

/// One dataset reference as written in a parameter value.
#[derive(Debug, Clone, Copy)]
pub struct DatasetReference<'r> {
    pub dataset: &'r str,
    pub workspace_id: Option<&'r str>,
    pub configuration: &'r str,
    pub parameter: &'r str,
    pub constructor: bool,
}

/// Fixed precedence: explicit workspace, then the default model, then a
/// unique match over the whole catalog.
pub struct DatasetResolver<'r> {
    models: &'r ModelsByWorkspaceId,
    catalog: &'r dyn DatasetCatalog,
    tolerant: bool,
}

impl<'r> DatasetResolver<'r> {
    pub fn new(
        models: &'r ModelsByWorkspaceId,
        catalog: &'r dyn DatasetCatalog,
        tolerant: bool,
    ) -> Self {
        Self {
            models,
            catalog,
            tolerant,
        }
    }

    pub fn resolve(&self, reference: DatasetReference<'_>) -> Result<Resolution, DomainError> {
        let name = reference.dataset.trim();

        // 1. Explicit workspace
        if let Some(workspace_id) = reference.workspace_id {
            let model =
                self.models
                    .get(workspace_id)
                    .ok_or_else(|| DomainError::UnknownWorkspace {
                        workspace_id: workspace_id.to_string(),
                        configuration: reference.configuration.to_string(),
                    })?;
            debug!(dataset = name, workspace = workspace_id, model = %model.name, "Resolving in workspace model");
            return self.found_or_missing(model.find_dataset(name), reference);
        }

        // 2. Default model
        if let Some(model) = self.models.default_model() {
            debug!(dataset = name, model = %model.name, "Resolving in default model");
            return self.found_or_missing(model.find_dataset(name), reference);
        }

        // 3. Global unique name
        let mut matches = self.catalog.datasets_named(name);
        match matches.len() {
            0 => self.found_or_missing(None, reference),
            1 => Ok(Resolution::Found(matches.remove(0))),
            count => Err(DomainError::AmbiguousDataset {
                dataset: name.to_string(),
                configuration: reference.configuration.to_string(),
                count,
            }),
        }
    }

    fn found_or_missing(
        &self,
        dataset: Option<&Arc<Dataset>>,
        reference: DatasetReference<'_>,
    ) -> Result<Resolution, DomainError> {
        if let Some(dataset) = dataset {
            return Ok(Resolution::Found(Arc::clone(dataset)));
        }
        if !self.tolerant {
            return Err(DomainError::UnknownDataset {
                dataset: reference.dataset.to_string(),
                workspace_id: reference.workspace_id.map(str::to_string),
                configuration: reference.configuration.to_string(),
            });
        }
        Ok(Resolution::Missing(DatasetMiss {
            dataset: reference.dataset.to_string(),
            workspace_id: reference.workspace_id.map(str::to_string),
            configuration: reference.configuration.to_string(),
            parameter: reference.parameter.to_string(),
            drops_configuration: reference.constructor,
        }))
    }
}
