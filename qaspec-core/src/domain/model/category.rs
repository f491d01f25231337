// qaspec-core/src/domain/model/category.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::model::dataset::Model;

/// Hierarchical grouping of specifications and configurations.
#[derive(Debug, Clone)]
pub struct DataQualityCategory {
    pub name: String,
    pub abbreviation: Option<String>,
    pub uuid: Uuid,
    pub list_order: i32,
    pub description: Option<String>,
    pub parent: Option<Arc<DataQualityCategory>>,
    pub default_model: Option<Arc<Model>>,
    pub can_contain_quality_conditions: bool,
    pub can_contain_quality_specifications: bool,
    pub can_contain_sub_categories: bool,
}

impl DataQualityCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            uuid: Uuid::new_v4(),
            list_order: 0,
            description: None,
            parent: None,
            default_model: None,
            can_contain_quality_conditions: true,
            can_contain_quality_specifications: true,
            can_contain_sub_categories: true,
        }
    }

    /// Parent first, root last.
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<DataQualityCategory>> {
        std::iter::successors(self.parent.as_ref(), |c| c.parent.as_ref())
    }

    /// `Root/Child/Grandchild`
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.ancestors().map(|c| c.name.as_str()).collect();
        parts.reverse();
        parts.push(&self.name);
        parts.join("/")
    }
}
