// qaspec-core/src/application/import.rs

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::application::cache::{CacheContents, ReferenceCache, ResolutionContext};
use crate::application::index::{DocumentIndex, FragmentRef};
use crate::application::resolver::{DatasetMiss, ModelsByWorkspaceId, SkippedConfiguration};
use crate::application::validation::validate_index;
use crate::domain::error::DomainError;
use crate::domain::model::{
    DataQualityCategory, DescriptorKind, FragmentKind, InstanceDescriptor,
    IssueFilterConfiguration, QualityCondition, QualitySpecification, TransformerConfiguration,
    name_key,
};
use crate::domain::ports::{
    DatasetCatalog, DatasetValidator, IssueFilterExpressionParser, SignatureProvider,
};
use crate::domain::project::ImportSettings;
use crate::infrastructure::document::DataDictionaryDocument;

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Skip configurations with unknown datasets instead of failing.
    pub tolerant: bool,
    /// Model for dataset references that carry no workspace id.
    pub default_model: Option<String>,
}

impl From<&ImportSettings> for ImportOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            tolerant: settings.tolerant,
            default_model: settings.default_model.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum SpecificationSelection {
    #[default]
    All,
    Named(Vec<String>),
}

/// Domain objects built by one import. Fragments referenced from several
/// places appear once and are shared.
#[derive(Debug, Default)]
pub struct ImportResult {
    pub specifications: Vec<QualitySpecification>,
    pub conditions: Vec<Arc<QualityCondition>>,
    pub transformers: Vec<Arc<TransformerConfiguration>>,
    pub issue_filters: Vec<Arc<IssueFilterConfiguration>>,
    pub descriptors: Vec<Arc<InstanceDescriptor>>,
    pub categories: Vec<Arc<DataQualityCategory>>,
    pub misses: Vec<DatasetMiss>,
    /// Configurations left out in tolerant mode, in the order they were dropped.
    pub skipped: Vec<SkippedConfiguration>,
}

impl ImportResult {
    fn new(specifications: Vec<QualitySpecification>, contents: CacheContents) -> Self {
        Self {
            specifications,
            conditions: contents.conditions,
            transformers: contents.transformers,
            issue_filters: contents.issue_filters,
            descriptors: contents.descriptors,
            categories: contents.categories,
            misses: contents.misses,
            skipped: contents.skipped,
        }
    }

    pub fn specification(&self, name: &str) -> Option<&QualitySpecification> {
        self.specifications
            .iter()
            .find(|s| name_key(&s.name) == name_key(name))
    }

    pub fn condition(&self, name: &str) -> Option<&Arc<QualityCondition>> {
        self.conditions
            .iter()
            .find(|c| name_key(&c.name) == name_key(name))
    }

    pub fn transformer(&self, name: &str) -> Option<&Arc<TransformerConfiguration>> {
        self.transformers
            .iter()
            .find(|t| name_key(&t.name) == name_key(name))
    }
}

/// Converts documents into shared domain objects.
///
/// Every call validates the document, maps the workspaces the selected
/// fragments need, then builds the fragments through a fresh
/// [`ReferenceCache`].
pub struct Importer<'p> {
    signatures: &'p dyn SignatureProvider,
    catalog: &'p dyn DatasetCatalog,
    expressions: &'p dyn IssueFilterExpressionParser,
    dataset_validator: &'p dyn DatasetValidator,
    options: ImportOptions,
}

impl<'p> Importer<'p> {
    pub fn new(
        signatures: &'p dyn SignatureProvider,
        catalog: &'p dyn DatasetCatalog,
        expressions: &'p dyn IssueFilterExpressionParser,
        dataset_validator: &'p dyn DatasetValidator,
        options: ImportOptions,
    ) -> Self {
        Self {
            signatures,
            catalog,
            expressions,
            dataset_validator,
            options,
        }
    }

    #[instrument(skip_all, fields(tolerant = self.options.tolerant))]
    pub fn import_specifications(
        &self,
        document: &DataDictionaryDocument,
        selection: &SpecificationSelection,
    ) -> Result<ImportResult, DomainError> {
        let index = DocumentIndex::new(document);
        validate_index(&index)?;

        let selected = match selection {
            SpecificationSelection::All => index.specifications().to_vec(),
            SpecificationSelection::Named(names) => {
                let mut seen = HashSet::new();
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    let located = index.specification(name).ok_or_else(|| {
                        DomainError::UnknownReference {
                            kind: FragmentKind::QualitySpecification,
                            name: name.clone(),
                            referenced_by: "selection".to_string(),
                        }
                    })?;
                    if seen.insert(name_key(&located.record.name)) {
                        selected.push(located);
                    }
                }
                selected
            }
        };
        info!(specifications = selected.len(), "Importing quality specifications");

        let roots: Vec<_> = selected
            .iter()
            .map(|s| FragmentRef::Specification(*s))
            .collect();
        let mut cache = self.cache(index, &roots)?;

        let mut specifications = Vec::with_capacity(selected.len());
        for located in selected {
            specifications.push(cache.build_specification(located)?);
        }

        let result = ImportResult::new(specifications, cache.into_contents());
        info!(
            conditions = result.conditions.len(),
            transformers = result.transformers.len(),
            issue_filters = result.issue_filters.len(),
            misses = result.misses.len(),
            skipped = result.skipped.len(),
            "Import finished"
        );
        Ok(result)
    }

    /// Builds every quality condition of the document, with or without a
    /// specification referencing it.
    #[instrument(skip_all, fields(tolerant = self.options.tolerant))]
    pub fn import_conditions(
        &self,
        document: &DataDictionaryDocument,
    ) -> Result<ImportResult, DomainError> {
        let index = DocumentIndex::new(document);
        validate_index(&index)?;

        let selected = index.conditions().to_vec();
        let roots: Vec<_> = selected.iter().map(|c| FragmentRef::Condition(*c)).collect();
        let mut cache = self.cache(index, &roots)?;

        for located in &selected {
            cache.get_or_build_condition(&located.record.name, "selection")?;
        }

        let result = ImportResult::new(Vec::new(), cache.into_contents());
        info!(
            conditions = result.conditions.len(),
            misses = result.misses.len(),
            "Import finished"
        );
        Ok(result)
    }

    /// Builds all descriptors of the document. Needs no catalog access.
    #[instrument(skip_all)]
    pub fn import_descriptors(
        &self,
        document: &DataDictionaryDocument,
    ) -> Result<Vec<Arc<InstanceDescriptor>>, DomainError> {
        let index = DocumentIndex::new(document);
        validate_index(&index)?;

        let mut cache = ReferenceCache::new(index, self.context(ModelsByWorkspaceId::new()));
        for kind in [
            DescriptorKind::Test,
            DescriptorKind::Transformer,
            DescriptorKind::IssueFilter,
        ] {
            for record in cache.index().descriptors(kind) {
                cache.get_or_build_descriptor(kind, &record.name, "selection")?;
            }
        }

        let descriptors = cache.into_contents().descriptors;
        info!(descriptors = descriptors.len(), "Descriptors imported");
        Ok(descriptors)
    }

    fn context(&self, models: ModelsByWorkspaceId) -> ResolutionContext<'p> {
        ResolutionContext {
            signatures: self.signatures,
            catalog: self.catalog,
            expressions: self.expressions,
            dataset_validator: self.dataset_validator,
            models,
            tolerant: self.options.tolerant,
        }
    }

    fn cache<'a>(
        &self,
        index: DocumentIndex<'a>,
        roots: &[FragmentRef<'a>],
    ) -> Result<ReferenceCache<'a>, DomainError>
    where
        'p: 'a,
    {
        let models = self.map_workspaces(&index, roots)?;
        Ok(ReferenceCache::new(index, self.context(models)))
    }

    /// Maps the workspaces used by `roots` to catalog models. Ids the
    /// document does not declare stay unmapped and fail on first use.
    fn map_workspaces(
        &self,
        index: &DocumentIndex<'_>,
        roots: &[FragmentRef<'_>],
    ) -> Result<ModelsByWorkspaceId, DomainError> {
        let mut models = ModelsByWorkspaceId::new();

        for id in index.referenced_workspace_ids(roots, self.expressions)?.values() {
            let Some(workspace) = index.workspace(id) else {
                debug!(workspace = %id, "Workspace not declared in document");
                continue;
            };
            let model = self.catalog.model(&workspace.model_name).ok_or_else(|| {
                DomainError::UnknownModel {
                    model: workspace.model_name.clone(),
                    referenced_by: format!("workspace '{}'", workspace.id),
                }
            })?;
            debug!(workspace = %workspace.id, model = %model.name, "Workspace mapped");
            models.insert(&workspace.id, model);
        }

        // A declared default workspace must name a known model even when the
        // options pick another one.
        let declared_default = index
            .workspaces()
            .iter()
            .find(|w| w.id.trim().is_empty())
            .map(|workspace| {
                self.catalog.model(&workspace.model_name).ok_or_else(|| {
                    DomainError::UnknownModel {
                        model: workspace.model_name.clone(),
                        referenced_by: "workspace ''".to_string(),
                    }
                })
            })
            .transpose()?;

        match self.options.default_model.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let model = self
                    .catalog
                    .model(name)
                    .ok_or_else(|| DomainError::UnknownModel {
                        model: name.to_string(),
                        referenced_by: "import options".to_string(),
                    })?;
                models.insert("", model);
            }
            _ => {
                if let Some(model) = declared_default {
                    models.insert("", model);
                }
            }
        }

        info!(workspaces = models.len(), "Workspaces mapped");
        Ok(models)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::fixtures::{DICTIONARY, TestPorts};
    use crate::application::resolver::SkipCause;
    use crate::domain::error::ErrorKind;
    use crate::domain::model::ParameterValue;
    use crate::infrastructure::document::parse_document;
    use anyhow::Result;

    fn import_all(ports: &TestPorts, yaml: &str) -> Result<ImportResult, DomainError> {
        let document = parse_document(yaml).unwrap();
        ports
            .default_importer()
            .import_specifications(&document, &SpecificationSelection::All)
    }

    #[test]
    fn test_condition_resolves_dataset_in_workspace_model() -> Result<()> {
        let ports = TestPorts::new();
        let result = import_all(&ports, DICTIONARY)?;

        let c1 = result.condition("C1").unwrap();
        assert_eq!(c1.descriptor.name, "MinLength");
        assert_eq!(c1.descriptor.implementation.type_name, "QaMinLength");

        let feature_class = &c1.parameter_values[0];
        assert_eq!(feature_class.parameter, "featureClass");
        let roads = feature_class.dataset_value().unwrap();
        assert_eq!(roads.name, "Roads");
        assert_eq!(roads.model_name, "Model1");

        let names: Vec<_> = c1.parameter_values.iter().map(|p| p.parameter.as_str()).collect();
        assert_eq!(names, ["featureClass", "limit", "is3D"]);
        assert_eq!(c1.parameter_values[1].scalar_value(), Some("10.5"));
        Ok(())
    }

    #[test]
    fn test_shared_transformer_is_built_once() -> Result<()> {
        let ports = TestPorts::new();
        let result = import_all(&ports, DICTIONARY)?;

        let c2 = result.condition("C2").unwrap();
        let c3 = result.condition("C3").unwrap();
        let t_c2 = c2.parameter_values[0].value_source.as_ref().unwrap();
        let t_c3 = c3.parameter_values[0].value_source.as_ref().unwrap();
        assert!(Arc::ptr_eq(t_c2, t_c3));
        assert_eq!(result.transformers.len(), 1);
        assert!(c2.parameter_values[0].dataset_value().is_none());

        // C3 is an element of both specifications
        let roads = result.specification("Roads QA").unwrap();
        let hydro = result.specification("Hydro QA").unwrap();
        assert!(Arc::ptr_eq(&roads.elements[2].condition, &hydro.elements[0].condition));
        Ok(())
    }

    #[test]
    fn test_transformer_parameters_and_filters() -> Result<()> {
        let ports = TestPorts::new();
        let result = import_all(&ports, DICTIONARY)?;

        let t1 = result.transformer("T1").unwrap();
        assert_eq!(t1.parameter_values[0].dataset_value().unwrap().model_name, "DefaultModel");
        match &t1.parameter_values[1].value {
            ParameterValue::Dataset {
                dataset,
                filter_expression,
                ..
            } => {
                assert_eq!(dataset.as_ref().unwrap().model_name, "Model1");
                assert_eq!(filter_expression.as_deref(), Some("HEIGHT > 10"));
            }
            other => panic!("unexpected value {:?}", other),
        }

        let c1 = result.condition("C1").unwrap();
        assert_eq!(c1.issue_filters.len(), 1);
        assert_eq!(c1.issue_filters[0].name, "F1");
        assert_eq!(c1.category.as_ref().unwrap().qualified_name(), "Topology/Lines");
        Ok(())
    }

    #[test]
    fn test_element_overrides_and_order() -> Result<()> {
        let ports = TestPorts::new();
        let result = import_all(&ports, DICTIONARY)?;

        let roads = result.specification("Roads QA").unwrap();
        let names: Vec<_> = roads.elements.iter().map(|e| e.condition.name.as_str()).collect();
        assert_eq!(names, ["C1", "C2", "C3"]);
        assert_eq!(roads.elements[1].allow_errors_override, Some(true));
        assert!(roads.elements[1].allow_errors());
        Ok(())
    }

    #[test]
    fn test_duplicate_condition_fails_before_resolution() {
        let ports = TestPorts::new();
        // Neither the descriptor nor the dataset exist: the name check comes first
        let err = import_all(
            &ports,
            r#"
quality_conditions:
  - { name: QC1, descriptor: Nowhere }
  - { name: QC1, descriptor: Nowhere }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateName { .. }));
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn test_workspace_precedes_default_model() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
workspaces: [{ id: WS1, model_name: Model1 }]
test_descriptors: [{ name: MinLength, implementation: QaMinLength }]
quality_conditions:
  - name: A
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }
      - { type: scalar, parameter: limit, value: 1 }
  - name: B
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads }
      - { type: scalar, parameter: limit, value: 1 }
"#,
        )?;
        let result = ports.default_importer().import_conditions(&document)?;

        let a = result.condition("A").unwrap();
        let b = result.condition("B").unwrap();
        assert_eq!(a.parameter_values[0].dataset_value().unwrap().model_name, "Model1");
        assert_eq!(b.parameter_values[0].dataset_value().unwrap().model_name, "DefaultModel");
        Ok(())
    }

    const ROADS2: &str = r#"
workspaces: [{ id: WS1, model_name: Model1 }]
test_descriptors: [{ name: MinLength, implementation: QaMinLength }]
quality_specifications:
  - name: S
    elements: [{ condition: Keep }, { condition: Drop }]
quality_conditions:
  - name: Keep
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }
      - { type: scalar, parameter: limit, value: 1 }
  - name: Drop
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads2, workspace_id: WS1 }
      - { type: scalar, parameter: limit, value: 1 }
"#;

    #[test]
    fn test_tolerant_mode_skips_condition_with_unknown_dataset() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(ROADS2)?;
        let importer = ports.importer(ImportOptions {
            tolerant: true,
            default_model: None,
        });
        let result = importer.import_specifications(&document, &SpecificationSelection::All)?;

        assert!(result.condition("Drop").is_none());
        assert_eq!(result.conditions.len(), 1);
        assert_eq!(result.misses.len(), 1);
        assert_eq!(result.misses[0].dataset, "Roads2");
        assert_eq!(result.misses[0].workspace_id.as_deref(), Some("WS1"));

        let spec = result.specification("S").unwrap();
        assert_eq!(spec.elements.len(), 1);
        assert_eq!(spec.elements[0].condition.name, "Keep");
        Ok(())
    }

    #[test]
    fn test_strict_mode_fails_on_unknown_dataset() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(ROADS2)?;
        let err = ports
            .importer(ImportOptions::default())
            .import_specifications(&document, &SpecificationSelection::All)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownDataset { .. }));
        Ok(())
    }

    #[test]
    fn test_tolerant_miss_on_optional_parameter_keeps_condition() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
workspaces: [{ id: WS1, model_name: Model1 }]
test_descriptors: [{ name: Constraint, implementation: QaConstraint }]
quality_conditions:
  - name: C
    descriptor: Constraint
    parameters:
      - { type: dataset, parameter: table, dataset: Roads, workspace_id: WS1 }
      - { type: dataset, parameter: reference, dataset: Gone, workspace_id: WS1 }
      - { type: scalar, parameter: constraint, value: "LENGTH > 0" }
"#,
        )?;
        let importer = ports.importer(ImportOptions {
            tolerant: true,
            default_model: None,
        });
        let result = importer.import_conditions(&document)?;

        let c = result.condition("C").unwrap();
        assert!(c.parameter_values[1].dataset_value().is_none());
        assert_eq!(result.misses.len(), 1);
        assert!(!result.misses[0].drops_configuration);
        Ok(())
    }

    #[test]
    fn test_dropped_transformer_drops_dependents() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace("dataset: Rivers", "dataset: Lakes");
        let document = parse_document(&yaml)?;
        let importer = ports.importer(ImportOptions {
            tolerant: true,
            default_model: Some("DefaultModel".to_string()),
        });
        let result = importer.import_specifications(&document, &SpecificationSelection::All)?;

        assert!(result.transformer("T1").is_none());
        assert!(result.condition("C2").is_none());
        assert!(result.condition("C3").is_none());
        // T1 is reported once even though two conditions use it
        assert_eq!(result.misses.len(), 1);
        assert!(result.specification("Hydro QA").unwrap().elements.is_empty());

        let skipped = |name: &str| result.skipped.iter().find(|s| s.name == name).unwrap();
        assert_eq!(result.skipped.len(), 3);
        assert_eq!(result.skipped[0].name, "T1");
        assert_eq!(skipped("T1").kind, FragmentKind::Transformer);
        assert_eq!(
            skipped("T1").causes,
            [SkipCause::Dataset {
                parameter: "featureClass".to_string(),
                dataset: "Lakes".to_string(),
                workspace_id: None,
            }]
        );
        for condition in ["C2", "C3"] {
            assert_eq!(skipped(condition).kind, FragmentKind::QualityCondition);
            assert_eq!(
                skipped(condition).causes,
                [SkipCause::Transformer {
                    parameter: "featureClass".to_string(),
                    transformer: "T1".to_string(),
                }]
            );
        }
        Ok(())
    }

    #[test]
    fn test_dropped_issue_filter_is_reported_on_condition() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace(
            "{ type: dataset, parameter: featureClass, dataset: Buildings, workspace_id: WS1 }",
            "{ type: dataset, parameter: featureClass, dataset: Sheds, workspace_id: WS1 }",
        );
        let document = parse_document(&yaml)?;
        let result = ports
            .importer(ImportOptions {
                tolerant: true,
                default_model: Some("DefaultModel".to_string()),
            })
            .import_specifications(&document, &SpecificationSelection::All)?;

        assert!(result.condition("C1").is_none());
        let c1 = result.skipped.iter().find(|s| s.name == "C1").unwrap();
        assert_eq!(
            c1.causes,
            [SkipCause::IssueFilter {
                issue_filter: "F1".to_string()
            }]
        );
        assert!(result.skipped.iter().any(|s| s.name == "F1"));
        Ok(())
    }

    #[test]
    fn test_unknown_parameter_is_version_mismatch() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace("parameter: is3D", "parameter: is4D");
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::UnknownParameter { .. }));
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        Ok(())
    }

    #[test]
    fn test_invalid_scalar_value() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace("value: \"10.5\"", "value: long");
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::InvalidScalarValue { .. }));
        Ok(())
    }

    #[test]
    fn test_parameter_kind_mismatch() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace(
            "{ type: scalar, parameter: limit, value: \"10.5\" }",
            "{ type: dataset, parameter: limit, dataset: Roads }",
        );
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::ParameterKindMismatch { expected: "scalar", .. }));
        Ok(())
    }

    #[test]
    fn test_dataset_type_rejected() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace(
            "dataset: Roads, workspace_id: WS1",
            "dataset: Elevation",
        );
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDataset { .. }));
        Ok(())
    }

    #[test]
    fn test_constructor_dataset_without_value() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace(
            "{ type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }",
            "{ type: dataset, parameter: featureClass }",
        );
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::MissingDatasetValue { .. }));
        Ok(())
    }

    #[test]
    fn test_unknown_workspace_and_model() -> Result<()> {
        let ports = TestPorts::new();

        let yaml = DICTIONARY.replace("workspace_id: WS1, where_clause", "workspace_id: WS9, where_clause");
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::UnknownWorkspace { .. }));

        let yaml = DICTIONARY.replace("model_name: Model1", "model_name: Model9");
        let err = import_all(&ports, &yaml).unwrap_err();
        assert!(matches!(err, DomainError::UnknownModel { .. }));
        Ok(())
    }

    #[test]
    fn test_declared_default_workspace_with_unknown_model() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
workspaces:
  - { id: "", model_name: NoSuchModel }
  - { id: WS9, model_name: NoSuchModel2 }
test_descriptors: [{ name: MinLength, implementation: QaMinLength }]
quality_conditions:
  - name: C1
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Rivers }
      - { type: scalar, parameter: limit, value: 1 }
"#,
        )?;

        for importer in [
            ports.importer(ImportOptions::default()),
            ports.default_importer(),
        ] {
            match importer.import_conditions(&document).unwrap_err() {
                DomainError::UnknownModel {
                    model,
                    referenced_by,
                } => {
                    assert_eq!(model, "NoSuchModel");
                    assert_eq!(referenced_by, "workspace ''");
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
        Ok(())
    }

    #[test]
    fn test_declared_default_workspace_supplies_model() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
workspaces: [{ id: "", model_name: DefaultModel }]
test_descriptors: [{ name: MinLength, implementation: QaMinLength }]
quality_conditions:
  - name: C1
    descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Rivers }
      - { type: scalar, parameter: limit, value: 1 }
"#,
        )?;
        let result = ports
            .importer(ImportOptions::default())
            .import_conditions(&document)?;

        let rivers = result.condition("C1").unwrap().parameter_values[0]
            .dataset_value()
            .unwrap()
            .clone();
        assert_eq!(rivers.model_name, "DefaultModel");
        Ok(())
    }

    #[test]
    fn test_unknown_issue_filter_reference() -> Result<()> {
        let ports = TestPorts::new();
        let yaml = DICTIONARY.replace("issue_filter_expression: F1", "issue_filter_expression: F1 OR F2");
        let err = import_all(&ports, &yaml).unwrap_err();
        match err {
            DomainError::UnknownReference { kind, name, .. } => {
                assert_eq!(kind, FragmentKind::IssueFilter);
                assert_eq!(name, "F2");
            }
            other => panic!("unexpected error {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_cyclic_transformers_rejected() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
transformer_descriptors: [{ name: OnlyContained, implementation: TrOnlyContainedFeatures }]
transformers:
  - name: T1
    descriptor: OnlyContained
    parameters: [{ type: dataset, parameter: featureClass, transformer: T2 }]
  - name: T2
    descriptor: OnlyContained
    parameters: [{ type: dataset, parameter: featureClass, transformer: T1 }]
"#,
        )?;
        let err = ports.default_importer().import_conditions(&document).unwrap_err();
        assert!(matches!(err, DomainError::CyclicReference(_)));
        Ok(())
    }

    #[test]
    fn test_named_selection() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(DICTIONARY)?;
        let importer = ports.default_importer();

        let result = importer.import_specifications(
            &document,
            &SpecificationSelection::Named(vec!["hydro qa".to_string()]),
        )?;
        assert_eq!(result.specifications.len(), 1);
        assert!(result.condition("C1").is_none());
        assert!(result.condition("C3").is_some());

        let result = importer.import_specifications(
            &document,
            &SpecificationSelection::Named(vec!["Hydro QA".to_string(), "hydro qa".to_string()]),
        )?;
        assert_eq!(result.specifications.len(), 1);

        let err = importer
            .import_specifications(
                &document,
                &SpecificationSelection::Named(vec!["Nope".to_string()]),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownReference { .. }));
        Ok(())
    }

    #[test]
    fn test_descriptors_without_catalog() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(DICTIONARY)?;
        let descriptors = ports
            .importer(ImportOptions::default())
            .import_descriptors(&document)?;
        assert_eq!(descriptors.len(), 4);
        assert!(descriptors.iter().any(|d| d.kind == DescriptorKind::IssueFilter));
        Ok(())
    }

    #[test]
    fn test_legacy_document_imports() -> Result<()> {
        let ports = TestPorts::new();
        let document = parse_document(
            r#"
namespace: "urn:qaspec:data-dictionary:2.0"
workspaces: [{ id: WS1, model_name: Model1 }]
test_descriptors: [{ name: MinLength, implementation: QaMinLength }]
quality_specifications:
  - name: Legacy
    elements: [{ condition: L1 }]
quality_conditions:
  - name: L1
    test_descriptor: MinLength
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }
      - { type: scalar, parameter: limit, value: 3 }
"#,
        )?;
        let result = ports
            .importer(ImportOptions::default())
            .import_specifications(&document, &SpecificationSelection::All)?;
        let l1 = result.condition("L1").unwrap();
        assert_eq!(l1.parameter_values[0].dataset_value().unwrap().label(), "Model1:Roads");
        assert_eq!(l1.parameter_values[1].scalar_value(), Some("3"));
        Ok(())
    }
}
