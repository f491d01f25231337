// qaspec-core/src/infrastructure/document/legacy.rs
//
// Records of the 2.0 schema. The older format only knows tests: no
// transformers, no issue filters, no value sources. Documents are upgraded to
// the current record set right after parsing.

use serde::Deserialize;
use uuid::Uuid;

use crate::infrastructure::document::model::{
    AuditRecord, CategoryRecord, ConfigurationRecord, DataDictionaryDocument, DescriptorRecord,
    ParameterValueRecord, SpecificationRecord, WorkspaceRecord, default_true, scalar_text,
};
use crate::infrastructure::document::version::NAMESPACE_CURRENT;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyDocument {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceRecord>,
    #[serde(default)]
    pub categories: Vec<LegacyCategoryRecord>,
    #[serde(default)]
    pub test_descriptors: Vec<DescriptorRecord>,
    #[serde(default)]
    pub quality_specifications: Vec<SpecificationRecord>,
    #[serde(default)]
    pub quality_conditions: Vec<LegacyConditionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyCategoryRecord {
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub list_order: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_model_name: Option<String>,
    #[serde(default = "default_true")]
    pub can_contain_quality_conditions: bool,
    #[serde(default = "default_true")]
    pub can_contain_quality_specifications: bool,
    #[serde(default = "default_true")]
    pub can_contain_sub_categories: bool,
    #[serde(default)]
    pub sub_categories: Vec<LegacyCategoryRecord>,
    #[serde(default)]
    pub quality_specifications: Vec<SpecificationRecord>,
    #[serde(default)]
    pub quality_conditions: Vec<LegacyConditionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyConditionRecord {
    pub name: String,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub version_uuid: Option<Uuid>,
    pub test_descriptor: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub audit: AuditRecord,
    #[serde(default)]
    pub parameters: Vec<LegacyParameterRecord>,
    #[serde(default)]
    pub allow_errors: Option<bool>,
    #[serde(default)]
    pub stop_on_error: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegacyParameterRecord {
    Scalar {
        parameter: String,
        #[serde(default, deserialize_with = "scalar_text")]
        value: Option<String>,
    },
    Dataset {
        parameter: String,
        #[serde(default)]
        dataset: Option<String>,
        #[serde(default)]
        workspace_id: Option<String>,
        #[serde(default)]
        where_clause: Option<String>,
        #[serde(default)]
        used_as_reference_data: bool,
    },
}

impl From<LegacyParameterRecord> for ParameterValueRecord {
    fn from(record: LegacyParameterRecord) -> Self {
        match record {
            LegacyParameterRecord::Scalar { parameter, value } => Self::Scalar {
                parameter,
                value,
                transformer: None,
            },
            LegacyParameterRecord::Dataset {
                parameter,
                dataset,
                workspace_id,
                where_clause,
                used_as_reference_data,
            } => Self::Dataset {
                parameter,
                dataset,
                workspace_id,
                where_clause,
                used_as_reference_data,
                transformer: None,
            },
        }
    }
}

impl From<LegacyConditionRecord> for ConfigurationRecord {
    fn from(record: LegacyConditionRecord) -> Self {
        let mut upgraded = ConfigurationRecord::new(record.name, record.test_descriptor);
        upgraded.uuid = record.uuid;
        upgraded.version_uuid = record.version_uuid;
        upgraded.url = record.url;
        upgraded.description = record.description;
        upgraded.notes = record.notes;
        upgraded.audit = record.audit;
        upgraded.parameters = record.parameters.into_iter().map(Into::into).collect();
        upgraded.allow_errors = record.allow_errors;
        upgraded.stop_on_error = record.stop_on_error;
        upgraded
    }
}

impl From<LegacyCategoryRecord> for CategoryRecord {
    fn from(record: LegacyCategoryRecord) -> Self {
        let mut upgraded = CategoryRecord::new(record.name);
        upgraded.abbreviation = record.abbreviation;
        upgraded.uuid = record.uuid;
        upgraded.list_order = record.list_order;
        upgraded.description = record.description;
        upgraded.default_model_name = record.default_model_name;
        upgraded.can_contain_quality_conditions = record.can_contain_quality_conditions;
        upgraded.can_contain_quality_specifications = record.can_contain_quality_specifications;
        upgraded.can_contain_sub_categories = record.can_contain_sub_categories;
        upgraded.sub_categories = record.sub_categories.into_iter().map(Into::into).collect();
        upgraded.quality_specifications = record.quality_specifications;
        upgraded.quality_conditions = record
            .quality_conditions
            .into_iter()
            .map(Into::into)
            .collect();
        upgraded
    }
}

impl From<LegacyDocument> for DataDictionaryDocument {
    fn from(legacy: LegacyDocument) -> Self {
        Self {
            namespace: NAMESPACE_CURRENT.to_string(),
            workspaces: legacy.workspaces,
            categories: legacy.categories.into_iter().map(Into::into).collect(),
            test_descriptors: legacy.test_descriptors,
            quality_specifications: legacy.quality_specifications,
            quality_conditions: legacy
                .quality_conditions
                .into_iter()
                .map(Into::into)
                .collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    const LEGACY: &str = r#"
namespace: urn:qaspec:data-dictionary:2.0
workspaces:
  - id: WS1
    model_name: Model1
test_descriptors:
  - name: QaMinLength
    implementation: QaMinLength
categories:
  - name: Roads
    quality_conditions:
      - name: C1
        test_descriptor: QaMinLength
        parameters:
          - type: dataset
            parameter: featureClass
            dataset: Roads
            workspace_id: WS1
          - type: scalar
            parameter: limit
            value: 5
"#;

    #[test]
    fn test_upgrade_moves_descriptor_name() -> Result<()> {
        let legacy: LegacyDocument = serde_yaml::from_str(LEGACY)?;
        let document = DataDictionaryDocument::from(legacy);

        assert_eq!(document.namespace, NAMESPACE_CURRENT);
        let condition = &document.categories[0].quality_conditions[0];
        assert_eq!(condition.descriptor, "QaMinLength");
        assert_eq!(condition.parameters.len(), 2);
        assert_eq!(
            condition.parameters[1],
            ParameterValueRecord::scalar("limit", "5")
        );
        assert!(condition.transformer_references().next().is_none());
        assert!(document.transformers.is_empty());
        Ok(())
    }

    #[test]
    fn test_legacy_root_rejects_transformers() {
        let text = "namespace: urn:qaspec:data-dictionary:2.0\ntransformers: []\n";
        assert!(serde_yaml::from_str::<LegacyDocument>(text).is_err());
    }
}
