// qaspec-core/src/application/export.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::graph::ReferenceClosure;
use crate::domain::model::{
    AuditInfo, DataQualityCategory, DescriptorKind, InstanceConfiguration, InstanceDescriptor,
    ParameterValue, QualityCondition, QualitySpecification, TestParameterValue, name_key,
};
use crate::domain::project::ExportSettings;
use crate::infrastructure::document::{
    AuditRecord, CategoryRecord, ConfigurationRecord, DataDictionaryDocument, DescriptorRecord,
    ElementRecord, ParameterValueRecord, SpecificationRecord, WorkspaceRecord,
};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write every known descriptor, not only the used ones.
    pub all_descriptors: bool,
    /// Write created/changed audit fields.
    pub metadata: bool,
    pub notes: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            all_descriptors: false,
            metadata: true,
            notes: true,
        }
    }
}

impl From<&ExportSettings> for ExportOptions {
    fn from(settings: &ExportSettings) -> Self {
        Self {
            all_descriptors: settings.all_descriptors,
            metadata: settings.metadata,
            notes: settings.notes,
        }
    }
}

/// Writes live specifications back into a document.
///
/// Output is canonical: categories and specifications ordered by
/// (list order, name), everything else by name, parameter values in declared
/// order. Exporting the same objects twice renders the same text.
pub struct Exporter {
    options: ExportOptions,
    /// Model name key -> workspace id
    workspace_ids: BTreeMap<String, String>,
}

impl Exporter {
    pub fn new(options: ExportOptions, workspace_ids: &BTreeMap<String, String>) -> Self {
        Self {
            options,
            workspace_ids: workspace_ids
                .iter()
                .map(|(model, id)| (name_key(model), id.clone()))
                .collect(),
        }
    }

    /// Models without an assigned id use their name.
    pub fn workspace_id(&self, model_name: &str) -> String {
        self.workspace_ids
            .get(&name_key(model_name))
            .cloned()
            .unwrap_or_else(|| model_name.to_string())
    }

    #[instrument(skip_all, fields(specifications = specifications.len()))]
    pub fn export(
        &self,
        specifications: &[QualitySpecification],
        known_descriptors: &[Arc<InstanceDescriptor>],
    ) -> DataDictionaryDocument {
        let closure = ReferenceClosure::from_specifications(specifications);
        self.write(&closure, specifications, known_descriptors)
    }

    /// Exports conditions that do not need to belong to a specification.
    #[instrument(skip_all, fields(conditions = conditions.len()))]
    pub fn export_conditions(
        &self,
        conditions: &[Arc<QualityCondition>],
        known_descriptors: &[Arc<InstanceDescriptor>],
    ) -> DataDictionaryDocument {
        let closure = ReferenceClosure::from_conditions(conditions);
        self.write(&closure, &[], known_descriptors)
    }

    fn write(
        &self,
        closure: &ReferenceClosure,
        specifications: &[QualitySpecification],
        known_descriptors: &[Arc<InstanceDescriptor>],
    ) -> DataDictionaryDocument {
        let mut document = DataDictionaryDocument {
            workspaces: self.workspaces(closure),
            ..DataDictionaryDocument::default()
        };

        // 1. Descriptors
        let mut descriptors = closure.descriptors();
        if self.options.all_descriptors {
            descriptors.extend(known_descriptors.iter().cloned());
        }
        let mut seen = HashSet::new();
        for descriptor in descriptors {
            if !seen.insert((descriptor.kind, name_key(&descriptor.name))) {
                continue;
            }
            let record = self.descriptor_record(&descriptor);
            match descriptor.kind {
                DescriptorKind::Test => document.test_descriptors.push(record),
                DescriptorKind::Transformer => document.transformer_descriptors.push(record),
                DescriptorKind::IssueFilter => document.issue_filter_descriptors.push(record),
            }
        }
        for list in [
            &mut document.test_descriptors,
            &mut document.transformer_descriptors,
            &mut document.issue_filter_descriptors,
        ] {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        // 2. Fragments, grouped by owning category
        let categories = closure.categories(specifications);
        let mut tree = CategoryTree::new(&categories);

        for specification in specifications {
            let record = self.specification_record(specification);
            tree.content(specification.category.as_ref(), &mut document)
                .quality_specifications
                .push(record);
        }
        for condition in &closure.conditions {
            let record = self.condition_record(condition);
            tree.content(condition.category.as_ref(), &mut document)
                .quality_conditions
                .push(record);
        }
        for transformer in &closure.transformers {
            let record = self.configuration_record(&transformer.configuration);
            tree.content(transformer.category.as_ref(), &mut document)
                .transformers
                .push(record);
        }
        for filter in &closure.issue_filters {
            let record = self.configuration_record(&filter.configuration);
            tree.content(filter.category.as_ref(), &mut document)
                .issue_filters
                .push(record);
        }

        // 3. Category records, nested
        document.categories = tree.into_records(self);
        sort_fragments(
            &mut document.quality_specifications,
            &mut document.quality_conditions,
            &mut document.transformers,
            &mut document.issue_filters,
        );

        info!(
            conditions = closure.conditions.len(),
            transformers = closure.transformers.len(),
            issue_filters = closure.issue_filters.len(),
            categories = categories.len(),
            "Document exported"
        );
        document
    }

    fn workspaces(&self, closure: &ReferenceClosure) -> Vec<WorkspaceRecord> {
        let mut by_model: BTreeMap<String, WorkspaceRecord> = BTreeMap::new();
        for dataset in closure.datasets() {
            by_model
                .entry(name_key(&dataset.model_name))
                .or_insert_with(|| {
                    WorkspaceRecord::new(self.workspace_id(&dataset.model_name), &dataset.model_name)
                });
        }
        let mut workspaces: Vec<_> = by_model.into_values().collect();
        workspaces.sort_by(|a, b| a.id.cmp(&b.id));
        workspaces
    }

    // --- RECORDS ---

    fn audit(&self, audit: &AuditInfo) -> AuditRecord {
        if !self.options.metadata {
            return AuditRecord::default();
        }
        AuditRecord {
            created_by: audit.created_by.clone(),
            created_at: audit.created_at,
            changed_by: audit.changed_by.clone(),
            changed_at: audit.changed_at,
        }
    }

    fn notes(&self, notes: &Option<String>) -> Option<String> {
        if self.options.notes { notes.clone() } else { None }
    }

    fn descriptor_record(&self, descriptor: &InstanceDescriptor) -> DescriptorRecord {
        let mut record = DescriptorRecord::new(
            descriptor.name.clone(),
            descriptor.implementation.type_name.clone(),
            descriptor.implementation.constructor_id,
        );
        record.description = descriptor.description.clone();
        record.stop_on_error = descriptor.stop_on_error;
        record.allow_errors = descriptor.allow_errors;
        record.execution_priority = descriptor.execution_priority;
        record.audit = self.audit(&descriptor.audit);
        record
    }

    fn category_record(&self, category: &DataQualityCategory) -> CategoryRecord {
        let mut record = CategoryRecord::new(category.name.clone());
        record.abbreviation = category.abbreviation.clone();
        record.uuid = Some(category.uuid);
        record.list_order = category.list_order;
        record.description = category.description.clone();
        record.default_model_name = category.default_model.as_ref().map(|m| m.name.clone());
        record.can_contain_quality_conditions = category.can_contain_quality_conditions;
        record.can_contain_quality_specifications = category.can_contain_quality_specifications;
        record.can_contain_sub_categories = category.can_contain_sub_categories;
        record
    }

    fn specification_record(&self, specification: &QualitySpecification) -> SpecificationRecord {
        let mut record = SpecificationRecord::new(specification.name.clone());
        record.uuid = Some(specification.uuid);
        record.list_order = specification.list_order;
        record.tile_size = specification.tile_size;
        record.url = specification.url.clone();
        record.hidden = specification.hidden;
        record.description = specification.description.clone();
        record.notes = self.notes(&specification.notes);
        record.audit = self.audit(&specification.audit);
        record.elements = specification
            .elements
            .iter()
            .map(|element| ElementRecord {
                condition: element.condition.name.clone(),
                stop_on_error: element.stop_on_error_override,
                allow_errors: element.allow_errors_override,
                enabled: element.enabled,
            })
            .collect();
        record
    }

    fn condition_record(&self, condition: &QualityCondition) -> ConfigurationRecord {
        let mut record = self.configuration_record(&condition.configuration);
        record.version_uuid = Some(condition.version_uuid);
        record.allow_errors = condition.allow_errors_override;
        record.stop_on_error = condition.stop_on_error_override;
        record.never_filter_table_rows_using_related_geometry =
            condition.never_filter_table_rows_using_related_geometry;
        record.never_store_related_geometry_for_table_row_issues =
            condition.never_store_related_geometry_for_table_row_issues;
        record.issue_filter_expression = match &condition.issue_filter_expression {
            Some(expression) => Some(expression.clone()),
            None if !condition.issue_filters.is_empty() => Some(
                condition
                    .issue_filters
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" OR "),
            ),
            None => None,
        };
        record
    }

    fn configuration_record(&self, configuration: &InstanceConfiguration) -> ConfigurationRecord {
        let mut record = ConfigurationRecord::new(
            configuration.name.clone(),
            configuration.descriptor.name.clone(),
        );
        record.uuid = Some(configuration.uuid);
        record.url = configuration.url.clone();
        record.description = configuration.description.clone();
        record.notes = self.notes(&configuration.notes);
        record.audit = self.audit(&configuration.audit);
        record.parameters = configuration
            .parameter_values
            .iter()
            .map(|value| self.parameter_record(value))
            .collect();
        record
    }

    fn parameter_record(&self, value: &TestParameterValue) -> ParameterValueRecord {
        let transformer = value.value_source.as_ref().map(|t| t.name.clone());
        match &value.value {
            ParameterValue::Scalar { value: text } => ParameterValueRecord::Scalar {
                parameter: value.parameter.clone(),
                value: text.clone(),
                transformer,
            },
            ParameterValue::Dataset {
                dataset,
                filter_expression,
                used_as_reference_data,
            } => ParameterValueRecord::Dataset {
                parameter: value.parameter.clone(),
                dataset: dataset.as_ref().map(|d| d.name.clone()),
                workspace_id: dataset.as_ref().map(|d| self.workspace_id(&d.model_name)),
                where_clause: filter_expression.clone(),
                used_as_reference_data: *used_as_reference_data,
                transformer,
            },
        }
    }
}

fn sort_fragments(
    specifications: &mut [SpecificationRecord],
    conditions: &mut [ConfigurationRecord],
    transformers: &mut [ConfigurationRecord],
    issue_filters: &mut [ConfigurationRecord],
) {
    specifications.sort_by(|a, b| (a.list_order, &a.name).cmp(&(b.list_order, &b.name)));
    for list in [conditions, transformers, issue_filters] {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// Content buckets per exported category, keyed by pointer identity.
struct CategoryTree<'c> {
    categories: &'c [Arc<DataQualityCategory>],
    slots: HashMap<*const DataQualityCategory, usize>,
    contents: Vec<CategoryRecord>,
}

impl<'c> CategoryTree<'c> {
    fn new(categories: &'c [Arc<DataQualityCategory>]) -> Self {
        let slots = categories
            .iter()
            .enumerate()
            .map(|(slot, c)| (Arc::as_ptr(c), slot))
            .collect();
        Self {
            categories,
            slots,
            contents: categories
                .iter()
                .map(|c| CategoryRecord::new(c.name.clone()))
                .collect(),
        }
    }

    /// Bucket of `category`, or the document root when there is none.
    fn content<'d>(
        &'d mut self,
        category: Option<&Arc<DataQualityCategory>>,
        document: &'d mut DataDictionaryDocument,
    ) -> Bucket<'d> {
        match category.and_then(|c| self.slots.get(&Arc::as_ptr(c))) {
            Some(&slot) => {
                let record = &mut self.contents[slot];
                Bucket {
                    quality_specifications: &mut record.quality_specifications,
                    quality_conditions: &mut record.quality_conditions,
                    transformers: &mut record.transformers,
                    issue_filters: &mut record.issue_filters,
                }
            }
            None => Bucket {
                quality_specifications: &mut document.quality_specifications,
                quality_conditions: &mut document.quality_conditions,
                transformers: &mut document.transformers,
                issue_filters: &mut document.issue_filters,
            },
        }
    }

    /// Root category records with children nested below their parents.
    fn into_records(self, exporter: &Exporter) -> Vec<CategoryRecord> {
        let mut children: HashMap<Option<usize>, Vec<usize>> = HashMap::new();
        for (slot, category) in self.categories.iter().enumerate() {
            let parent = category
                .parent
                .as_ref()
                .and_then(|p| self.slots.get(&Arc::as_ptr(p)).copied());
            children.entry(parent).or_default().push(slot);
        }

        let mut contents: Vec<Option<CategoryRecord>> =
            self.contents.into_iter().map(Some).collect();
        build_level(None, self.categories, &children, &mut contents, exporter)
    }
}

struct Bucket<'d> {
    quality_specifications: &'d mut Vec<SpecificationRecord>,
    quality_conditions: &'d mut Vec<ConfigurationRecord>,
    transformers: &'d mut Vec<ConfigurationRecord>,
    issue_filters: &'d mut Vec<ConfigurationRecord>,
}

fn build_level(
    parent: Option<usize>,
    categories: &[Arc<DataQualityCategory>],
    children: &HashMap<Option<usize>, Vec<usize>>,
    contents: &mut [Option<CategoryRecord>],
    exporter: &Exporter,
) -> Vec<CategoryRecord> {
    let Some(slots) = children.get(&parent) else {
        return Vec::new();
    };

    let mut level = Vec::with_capacity(slots.len());
    for &slot in slots {
        let Some(content) = contents[slot].take() else {
            continue;
        };
        let mut record = exporter.category_record(&categories[slot]);
        record.quality_specifications = content.quality_specifications;
        record.quality_conditions = content.quality_conditions;
        record.transformers = content.transformers;
        record.issue_filters = content.issue_filters;
        sort_fragments(
            &mut record.quality_specifications,
            &mut record.quality_conditions,
            &mut record.transformers,
            &mut record.issue_filters,
        );
        record.sub_categories = build_level(Some(slot), categories, children, contents, exporter);
        debug!(category = %record.name, "Category exported");
        level.push(record);
    }
    level.sort_by(|a, b| (a.list_order, &a.name).cmp(&(b.list_order, &b.name)));
    level
}
