// qaspec-core/src/infrastructure/document/model.rs
//
// Flat, string-keyed records of the exchange document. Cross references are
// names; nothing here knows about the domain graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::infrastructure::document::version::NAMESPACE_CURRENT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionaryDocument {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<WorkspaceRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_descriptors: Vec<DescriptorRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformer_descriptors: Vec<DescriptorRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue_filter_descriptors: Vec<DescriptorRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_specifications: Vec<SpecificationRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_conditions: Vec<ConfigurationRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformers: Vec<ConfigurationRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue_filters: Vec<ConfigurationRecord>,
}

impl Default for DataDictionaryDocument {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            workspaces: Vec::new(),
            categories: Vec::new(),
            test_descriptors: Vec::new(),
            transformer_descriptors: Vec::new(),
            issue_filter_descriptors: Vec::new(),
            quality_specifications: Vec::new(),
            quality_conditions: Vec::new(),
            transformers: Vec::new(),
            issue_filters: Vec::new(),
        }
    }
}

impl DataDictionaryDocument {
    /// Total number of configuration and specification records, including
    /// the ones nested in categories.
    pub fn fragment_count(&self) -> usize {
        fn nested(category: &CategoryRecord) -> usize {
            category.quality_specifications.len()
                + category.quality_conditions.len()
                + category.transformers.len()
                + category.issue_filters.len()
                + category.sub_categories.iter().map(nested).sum::<usize>()
        }
        self.quality_specifications.len()
            + self.quality_conditions.len()
            + self.transformers.len()
            + self.issue_filters.len()
            + self.categories.iter().map(nested).sum::<usize>()
    }
}

/// Maps a short id to a model so dataset references need not repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub id: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_owner: Option<String>,
}

impl WorkspaceRecord {
    pub fn new(id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_name: model_name.into(),
            factory: None,
            connection_string: None,
            catalog_path: None,
            database: None,
            schema_owner: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub list_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_name: Option<String>,

    #[serde(default = "default_true")]
    pub can_contain_quality_conditions: bool,
    #[serde(default = "default_true")]
    pub can_contain_quality_specifications: bool,
    #[serde(default = "default_true")]
    pub can_contain_sub_categories: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_categories: Vec<CategoryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_specifications: Vec<SpecificationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_conditions: Vec<ConfigurationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformers: Vec<ConfigurationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue_filters: Vec<ConfigurationRecord>,
}

impl CategoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            uuid: None,
            list_order: 0,
            description: None,
            default_model_name: None,
            can_contain_quality_conditions: true,
            can_contain_quality_specifications: true,
            can_contain_sub_categories: true,
            sub_categories: Vec::new(),
            quality_specifications: Vec::new(),
            quality_conditions: Vec::new(),
            transformers: Vec::new(),
            issue_filters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<DateTime<Utc>>,
}

impl AuditRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Test, transformer and issue filter descriptors share this record. The
/// condition defaults only mean something for test descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorRecord {
    pub name: String,
    pub implementation: String,
    #[serde(default)]
    pub constructor: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stop_on_error: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_priority: Option<i32>,
    #[serde(flatten)]
    pub audit: AuditRecord,
}

impl DescriptorRecord {
    pub fn new(name: impl Into<String>, implementation: impl Into<String>, constructor: u32) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            constructor,
            description: None,
            stop_on_error: false,
            allow_errors: false,
            execution_priority: None,
            audit: AuditRecord::default(),
        }
    }
}

/// Shared shape of conditions, transformers and issue filters. The trailing
/// block is only written for quality conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_uuid: Option<Uuid>,
    pub descriptor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub audit: AuditRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterValueRecord>,

    // --- quality conditions only ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub never_filter_table_rows_using_related_geometry: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub never_store_related_geometry_for_table_row_issues: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_filter_expression: Option<String>,
}

impl ConfigurationRecord {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: None,
            version_uuid: None,
            descriptor: descriptor.into(),
            url: None,
            description: None,
            notes: None,
            audit: AuditRecord::default(),
            parameters: Vec::new(),
            allow_errors: None,
            stop_on_error: None,
            never_filter_table_rows_using_related_geometry: false,
            never_store_related_geometry_for_table_row_issues: false,
            issue_filter_expression: None,
        }
    }

    /// Transformer names used as value sources, in parameter order.
    pub fn transformer_references(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().filter_map(|p| p.transformer())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterValueRecord {
    Scalar {
        parameter: String,
        #[serde(
            default,
            deserialize_with = "scalar_text",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transformer: Option<String>,
    },
    Dataset {
        parameter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dataset: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workspace_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        where_clause: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        used_as_reference_data: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transformer: Option<String>,
    },
}

impl ParameterValueRecord {
    pub fn scalar(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Scalar {
            parameter: parameter.into(),
            value: Some(value.into()),
            transformer: None,
        }
    }

    pub fn dataset(
        parameter: impl Into<String>,
        dataset: impl Into<String>,
        workspace_id: Option<&str>,
    ) -> Self {
        Self::Dataset {
            parameter: parameter.into(),
            dataset: Some(dataset.into()),
            workspace_id: workspace_id.map(str::to_string),
            where_clause: None,
            used_as_reference_data: false,
            transformer: None,
        }
    }

    pub fn from_transformer(parameter: impl Into<String>, transformer: impl Into<String>) -> Self {
        Self::Dataset {
            parameter: parameter.into(),
            dataset: None,
            workspace_id: None,
            where_clause: None,
            used_as_reference_data: false,
            transformer: Some(transformer.into()),
        }
    }

    pub fn parameter(&self) -> &str {
        match self {
            Self::Scalar { parameter, .. } | Self::Dataset { parameter, .. } => parameter,
        }
    }

    pub fn transformer(&self) -> Option<&str> {
        match self {
            Self::Scalar { transformer, .. } | Self::Dataset { transformer, .. } => {
                transformer.as_deref().filter(|t| !t.trim().is_empty())
            }
        }
    }

    pub fn is_dataset(&self) -> bool {
        matches!(self, Self::Dataset { .. })
    }

    /// Workspace id of a dataset value, if any.
    pub fn workspace_id(&self) -> Option<&str> {
        match self {
            Self::Dataset { workspace_id, .. } => {
                workspace_id.as_deref().filter(|w| !w.trim().is_empty())
            }
            Self::Scalar { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub list_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub audit: AuditRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementRecord>,
}

impl SpecificationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: None,
            list_order: 0,
            tile_size: None,
            url: None,
            hidden: false,
            description: None,
            notes: None,
            audit: AuditRecord::default(),
            elements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_errors: Option<bool>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl ElementRecord {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            stop_on_error: None,
            allow_errors: None,
            enabled: true,
        }
    }
}

/// Literal values may be written as plain YAML scalars (`10`, `true`, `0.5`)
/// but are always carried as text.
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Literal {
        Text(String),
        Integer(i64),
        Float(f64),
        Boolean(bool),
    }

    Ok(Option::<Literal>::deserialize(deserializer)?.map(|literal| match literal {
        Literal::Text(text) => text,
        Literal::Integer(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Boolean(b) => b.to_string(),
    }))
}

fn default_namespace() -> String {
    NAMESPACE_CURRENT.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}
