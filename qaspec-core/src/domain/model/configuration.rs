// qaspec-core/src/domain/model/configuration.rs

use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::model::category::DataQualityCategory;
use crate::domain::model::dataset::Dataset;
use crate::domain::model::descriptor::InstanceDescriptor;

/// Created/changed metadata carried by most persisted entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditInfo {
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub changed_by: Option<String>,
    pub changed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar {
        value: Option<String>,
    },
    Dataset {
        dataset: Option<Arc<Dataset>>,
        filter_expression: Option<String>,
        used_as_reference_data: bool,
    },
}

/// One parameter assignment. When `value_source` is set, the transformer
/// computes the value and the literal part stays empty.
#[derive(Debug, Clone)]
pub struct TestParameterValue {
    pub parameter: String,
    pub value: ParameterValue,
    pub value_source: Option<Arc<TransformerConfiguration>>,
}

impl TestParameterValue {
    pub fn scalar(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            value: ParameterValue::Scalar {
                value: Some(value.into()),
            },
            value_source: None,
        }
    }

    pub fn dataset(parameter: impl Into<String>, dataset: Option<Arc<Dataset>>) -> Self {
        Self {
            parameter: parameter.into(),
            value: ParameterValue::Dataset {
                dataset,
                filter_expression: None,
                used_as_reference_data: false,
            },
            value_source: None,
        }
    }

    pub fn with_value_source(mut self, transformer: Arc<TransformerConfiguration>) -> Self {
        self.value_source = Some(transformer);
        self
    }

    pub fn is_dataset(&self) -> bool {
        matches!(self.value, ParameterValue::Dataset { .. })
    }

    pub fn dataset_value(&self) -> Option<&Arc<Dataset>> {
        match &self.value {
            ParameterValue::Dataset { dataset, .. } => dataset.as_ref(),
            ParameterValue::Scalar { .. } => None,
        }
    }

    pub fn scalar_value(&self) -> Option<&str> {
        match &self.value {
            ParameterValue::Scalar { value } => value.as_deref(),
            ParameterValue::Dataset { .. } => None,
        }
    }
}

/// Shared shape of conditions, transformers and issue filters.
#[derive(Debug, Clone)]
pub struct InstanceConfiguration {
    pub name: String,
    pub uuid: Uuid,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub audit: AuditInfo,
    pub category: Option<Arc<DataQualityCategory>>,
    pub descriptor: Arc<InstanceDescriptor>,
    pub parameter_values: Vec<TestParameterValue>,
}

impl InstanceConfiguration {
    pub fn new(name: impl Into<String>, descriptor: Arc<InstanceDescriptor>) -> Self {
        Self {
            name: name.into(),
            uuid: Uuid::new_v4(),
            description: None,
            notes: None,
            url: None,
            audit: AuditInfo::default(),
            category: None,
            descriptor,
            parameter_values: Vec::new(),
        }
    }

    /// Transformers used directly as value sources, in parameter order.
    pub fn value_sources(&self) -> impl Iterator<Item = &Arc<TransformerConfiguration>> {
        self.parameter_values
            .iter()
            .filter_map(|v| v.value_source.as_ref())
    }

    pub fn datasets(&self) -> impl Iterator<Item = &Arc<Dataset>> {
        self.parameter_values.iter().filter_map(|v| v.dataset_value())
    }
}

#[derive(Debug, Clone)]
pub struct TransformerConfiguration {
    pub configuration: InstanceConfiguration,
}

impl Deref for TransformerConfiguration {
    type Target = InstanceConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.configuration
    }
}

#[derive(Debug, Clone)]
pub struct IssueFilterConfiguration {
    pub configuration: InstanceConfiguration,
}

impl Deref for IssueFilterConfiguration {
    type Target = InstanceConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.configuration
    }
}

#[derive(Debug, Clone)]
pub struct QualityCondition {
    pub configuration: InstanceConfiguration,
    pub version_uuid: Uuid,
    // Tri-state: None falls back to the descriptor default
    pub allow_errors_override: Option<bool>,
    pub stop_on_error_override: Option<bool>,
    pub never_filter_table_rows_using_related_geometry: bool,
    pub never_store_related_geometry_for_table_row_issues: bool,
    pub issue_filter_expression: Option<String>,
    pub issue_filters: Vec<Arc<IssueFilterConfiguration>>,
}

impl QualityCondition {
    pub fn new(configuration: InstanceConfiguration) -> Self {
        Self {
            configuration,
            version_uuid: Uuid::new_v4(),
            allow_errors_override: None,
            stop_on_error_override: None,
            never_filter_table_rows_using_related_geometry: false,
            never_store_related_geometry_for_table_row_issues: false,
            issue_filter_expression: None,
            issue_filters: Vec::new(),
        }
    }

    pub fn allow_errors(&self) -> bool {
        self.allow_errors_override
            .unwrap_or(self.configuration.descriptor.allow_errors)
    }

    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error_override
            .unwrap_or(self.configuration.descriptor.stop_on_error)
    }
}

impl Deref for QualityCondition {
    type Target = InstanceConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::descriptor::{DescriptorKind, Implementation};

    fn descriptor(allow_errors: bool) -> Arc<InstanceDescriptor> {
        let mut descriptor = InstanceDescriptor::new(
            "QaMinLength",
            DescriptorKind::Test,
            Implementation::new("QaMinLength", 0),
        );
        descriptor.allow_errors = allow_errors;
        Arc::new(descriptor)
    }

    #[test]
    fn test_condition_overrides_fall_back_to_descriptor() {
        let mut condition =
            QualityCondition::new(InstanceConfiguration::new("C1", descriptor(true)));
        assert!(condition.allow_errors());
        assert!(!condition.stop_on_error());

        condition.allow_errors_override = Some(false);
        condition.stop_on_error_override = Some(true);
        assert!(!condition.allow_errors());
        assert!(condition.stop_on_error());
    }

    #[test]
    fn test_value_sources_follow_parameter_order() {
        let transformer = Arc::new(TransformerConfiguration {
            configuration: InstanceConfiguration::new("T1", descriptor(false)),
        });
        let mut configuration = InstanceConfiguration::new("C1", descriptor(false));
        configuration.parameter_values = vec![
            TestParameterValue::scalar("limit", "10"),
            TestParameterValue::dataset("featureClass", None)
                .with_value_source(Arc::clone(&transformer)),
        ];

        let sources: Vec<_> = configuration.value_sources().collect();
        assert_eq!(sources.len(), 1);
        assert!(Arc::ptr_eq(sources[0], &transformer));
        assert_eq!(configuration.parameter_values[0].scalar_value(), Some("10"));
        assert!(configuration.parameter_values[1].is_dataset());
    }
}
