// qaspec-core/src/domain/model/specification.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::model::category::DataQualityCategory;
use crate::domain::model::configuration::{AuditInfo, QualityCondition};

#[derive(Debug, Clone)]
pub struct QualitySpecificationElement {
    pub condition: Arc<QualityCondition>,
    pub stop_on_error_override: Option<bool>,
    pub allow_errors_override: Option<bool>,
    pub enabled: bool,
}

impl QualitySpecificationElement {
    pub fn new(condition: Arc<QualityCondition>) -> Self {
        Self {
            condition,
            stop_on_error_override: None,
            allow_errors_override: None,
            enabled: true,
        }
    }

    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error_override
            .unwrap_or_else(|| self.condition.stop_on_error())
    }

    pub fn allow_errors(&self) -> bool {
        self.allow_errors_override
            .unwrap_or_else(|| self.condition.allow_errors())
    }
}

#[derive(Debug, Clone)]
pub struct QualitySpecification {
    pub name: String,
    pub uuid: Uuid,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub list_order: i32,
    pub tile_size: Option<f64>,
    pub hidden: bool,
    pub audit: AuditInfo,
    pub category: Option<Arc<DataQualityCategory>>,
    pub elements: Vec<QualitySpecificationElement>,
}

impl QualitySpecification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: Uuid::new_v4(),
            description: None,
            notes: None,
            url: None,
            list_order: 0,
            tile_size: None,
            hidden: false,
            audit: AuditInfo::default(),
            category: None,
            elements: Vec::new(),
        }
    }

    pub fn enabled_conditions(&self) -> impl Iterator<Item = &Arc<QualityCondition>> {
        self.elements
            .iter()
            .filter(|e| e.enabled)
            .map(|e| &e.condition)
    }
}
