// qaspec-core/src/domain/model/dataset.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::domain::model::fragment::name_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatasetType {
    #[default]
    Vector,
    Table,
    Topology,
    Raster,
    Terrain,
}

impl DatasetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Table => "table",
            Self::Topology => "topology",
            Self::Raster => "raster",
            Self::Terrain => "terrain",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryType {
    Point,
    Multipoint,
    Polyline,
    Polygon,
    Multipatch,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Multipoint => "multipoint",
            Self::Polyline => "polyline",
            Self::Polygon => "polygon",
            Self::Multipatch => "multipatch",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dataset known to the catalog. Identified by (name, owning model).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub model_name: String,
    pub dataset_type: DatasetType,
    pub geometry_type: Option<GeometryType>,
}

impl Dataset {
    /// `Model:Dataset`, for messages and reports.
    pub fn label(&self) -> String {
        format!("{}:{}", self.model_name, self.name)
    }
}

/// A data model owning a set of datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    datasets: Vec<Arc<Dataset>>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datasets: Vec::new(),
        }
    }

    pub fn add_dataset(
        &mut self,
        name: impl Into<String>,
        dataset_type: DatasetType,
        geometry_type: Option<GeometryType>,
    ) -> Arc<Dataset> {
        let dataset = Arc::new(Dataset {
            name: name.into(),
            model_name: self.name.clone(),
            dataset_type,
            geometry_type,
        });
        self.datasets.push(Arc::clone(&dataset));
        dataset
    }

    pub fn datasets(&self) -> &[Arc<Dataset>] {
        &self.datasets
    }

    /// Case-insensitive lookup by the name the dataset has in this model.
    pub fn dataset_by_name(&self, name: &str) -> Option<&Arc<Dataset>> {
        self.datasets
            .iter()
            .find(|d| name_key(&d.name) == name_key(name))
    }

    /// Looks the dataset up as given, then by its unqualified form
    /// (`OWNER.ROADS` -> `ROADS`).
    pub fn find_dataset(&self, name: &str) -> Option<&Arc<Dataset>> {
        self.dataset_by_name(name).or_else(|| {
            let unqualified = unqualified_name(name);
            if unqualified.len() == name.len() {
                None
            } else {
                self.dataset_by_name(unqualified)
            }
        })
    }
}

/// Strips any database/owner qualification from a dataset name.
pub fn unqualified_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
