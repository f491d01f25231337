// qaspec-core/src/application/builder.rs
//
// Converts document fragments into domain objects. Nested references go back
// through the ReferenceCache so every fragment is built once.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::cache::ReferenceCache;
use crate::application::index::{CategoryId, Located};
use crate::application::resolver::{
    DatasetReference, Resolution, SkipCause, SkippedConfiguration,
};
use crate::domain::error::DomainError;
use crate::domain::model::{
    AuditInfo, DataQualityCategory, DescriptorKind, FragmentKind, Implementation,
    InstanceConfiguration,
    InstanceDescriptor, IssueFilterConfiguration, ParameterDefinition, ParameterType,
    ParameterValue, QualityCondition, QualitySpecification, QualitySpecificationElement,
    TestParameterValue, TransformerConfiguration,
};
use crate::infrastructure::document::{
    AuditRecord, ConfigurationRecord, DescriptorRecord, ParameterValueRecord, SpecificationRecord,
};

pub fn audit_info(record: &AuditRecord) -> AuditInfo {
    AuditInfo {
        created_by: record.created_by.clone(),
        created_at: record.created_at,
        changed_by: record.changed_by.clone(),
        changed_at: record.changed_at,
    }
}

pub fn build_descriptor(record: &DescriptorRecord, kind: DescriptorKind) -> InstanceDescriptor {
    let implementation = Implementation::new(record.implementation.trim(), record.constructor);
    let mut descriptor = InstanceDescriptor::new(record.name.clone(), kind, implementation);
    descriptor.description = record.description.clone();
    descriptor.stop_on_error = record.stop_on_error;
    descriptor.allow_errors = record.allow_errors;
    descriptor.execution_priority = record.execution_priority;
    descriptor.audit = audit_info(&record.audit);
    descriptor
}

pub fn build_category(
    cache: &ReferenceCache<'_>,
    id: CategoryId,
    parent: Option<Arc<DataQualityCategory>>,
) -> Result<DataQualityCategory, DomainError> {
    let indexed = cache.index().category(id);
    let record = indexed.record;

    let default_model = match record.default_model_name.as_deref().map(str::trim) {
        Some(model_name) if !model_name.is_empty() => Some(
            cache
                .context()
                .catalog
                .model(model_name)
                .ok_or_else(|| DomainError::UnknownModel {
                    model: model_name.to_string(),
                    referenced_by: format!("category '{}'", indexed.qualified_name),
                })?,
        ),
        _ => None,
    };

    let mut category = DataQualityCategory::new(record.name.clone());
    category.abbreviation = record.abbreviation.clone();
    category.uuid = record.uuid.unwrap_or_else(Uuid::new_v4);
    category.list_order = record.list_order;
    category.description = record.description.clone();
    category.parent = parent;
    category.default_model = default_model;
    category.can_contain_quality_conditions = record.can_contain_quality_conditions;
    category.can_contain_quality_specifications = record.can_contain_quality_specifications;
    category.can_contain_sub_categories = record.can_contain_sub_categories;
    Ok(category)
}

pub fn build_transformer<'a>(
    cache: &mut ReferenceCache<'a>,
    located: Located<'a, ConfigurationRecord>,
) -> Result<Option<TransformerConfiguration>, DomainError> {
    Ok(
        build_configuration(cache, located, DescriptorKind::Transformer)?
            .map(|configuration| TransformerConfiguration { configuration }),
    )
}

pub fn build_issue_filter<'a>(
    cache: &mut ReferenceCache<'a>,
    located: Located<'a, ConfigurationRecord>,
) -> Result<Option<IssueFilterConfiguration>, DomainError> {
    Ok(
        build_configuration(cache, located, DescriptorKind::IssueFilter)?
            .map(|configuration| IssueFilterConfiguration { configuration }),
    )
}

pub fn build_condition<'a>(
    cache: &mut ReferenceCache<'a>,
    located: Located<'a, ConfigurationRecord>,
) -> Result<Option<QualityCondition>, DomainError> {
    let record = located.record;
    let Some(configuration) = build_configuration(cache, located, DescriptorKind::Test)? else {
        return Ok(None);
    };

    let expression = record
        .issue_filter_expression
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let mut issue_filters = Vec::new();
    let mut causes = Vec::new();
    if let Some(expression) = expression {
        let names = cache.context().expressions.referenced_filters(expression)?;
        for name in names {
            match cache.get_or_build_issue_filter(&name, &record.name)? {
                Some(filter) => issue_filters.push(filter),
                None => causes.push(SkipCause::IssueFilter { issue_filter: name }),
            }
        }
    }
    if !causes.is_empty() {
        warn!(condition = %record.name, "Skipping condition: issue filter was skipped");
        cache.record_skip(SkippedConfiguration {
            kind: FragmentKind::QualityCondition,
            name: record.name.clone(),
            causes,
        });
        return Ok(None);
    }

    let mut condition = QualityCondition::new(configuration);
    condition.version_uuid = record.version_uuid.unwrap_or_else(Uuid::new_v4);
    condition.allow_errors_override = record.allow_errors;
    condition.stop_on_error_override = record.stop_on_error;
    condition.never_filter_table_rows_using_related_geometry =
        record.never_filter_table_rows_using_related_geometry;
    condition.never_store_related_geometry_for_table_row_issues =
        record.never_store_related_geometry_for_table_row_issues;
    condition.issue_filter_expression = expression.map(str::to_string);
    condition.issue_filters = issue_filters;
    Ok(Some(condition))
}

pub fn build_specification<'a>(
    cache: &mut ReferenceCache<'a>,
    located: Located<'a, SpecificationRecord>,
) -> Result<QualitySpecification, DomainError> {
    let record = located.record;
    let mut specification = QualitySpecification::new(record.name.clone());
    specification.uuid = record.uuid.unwrap_or_else(Uuid::new_v4);
    specification.description = record.description.clone();
    specification.notes = record.notes.clone();
    specification.url = record.url.clone();
    specification.list_order = record.list_order;
    specification.tile_size = record.tile_size;
    specification.hidden = record.hidden;
    specification.audit = audit_info(&record.audit);
    specification.category = located
        .category
        .map(|id| cache.get_or_build_category(id))
        .transpose()?;

    for element in &record.elements {
        match cache.get_or_build_condition(&element.condition, &record.name)? {
            Some(condition) => {
                let mut built = QualitySpecificationElement::new(condition);
                built.stop_on_error_override = element.stop_on_error;
                built.allow_errors_override = element.allow_errors;
                built.enabled = element.enabled;
                specification.elements.push(built);
            }
            None => {
                warn!(specification = %record.name, condition = %element.condition, "Omitting element of skipped condition");
            }
        }
    }
    Ok(specification)
}

/// Shared part of conditions, transformers and issue filters. `None` means
/// a constructor parameter could not be resolved in tolerant mode; the
/// causes are recorded on the cache.
fn build_configuration<'a>(
    cache: &mut ReferenceCache<'a>,
    located: Located<'a, ConfigurationRecord>,
    kind: DescriptorKind,
) -> Result<Option<InstanceConfiguration>, DomainError> {
    let record = located.record;
    debug!(configuration = %record.name, %kind, "Building configuration");

    let descriptor = cache.get_or_build_descriptor(kind, &record.descriptor, &record.name)?;
    let signature = cache.context().signatures.signature(&descriptor)?;

    let mut parameter_values = Vec::with_capacity(record.parameters.len());
    let mut causes = Vec::new();
    for value in &record.parameters {
        let definition =
            signature
                .find(value.parameter())
                .ok_or_else(|| DomainError::UnknownParameter {
                    configuration: record.name.clone(),
                    parameter: value.parameter().to_string(),
                    descriptor: descriptor.name.clone(),
                })?;

        match build_parameter_value(cache, &record.name, value, definition)? {
            Ok(built) => parameter_values.push(built),
            Err(cause) => causes.push(cause),
        }
    }

    if !causes.is_empty() {
        warn!(configuration = %record.name, "Skipping configuration with unresolved datasets");
        cache.record_skip(SkippedConfiguration {
            kind: configuration_kind(kind),
            name: record.name.clone(),
            causes,
        });
        return Ok(None);
    }

    let mut configuration = InstanceConfiguration::new(record.name.clone(), descriptor);
    configuration.uuid = record.uuid.unwrap_or_else(Uuid::new_v4);
    configuration.description = record.description.clone();
    configuration.notes = record.notes.clone();
    configuration.url = record.url.clone();
    configuration.audit = audit_info(&record.audit);
    configuration.category = located
        .category
        .map(|id| cache.get_or_build_category(id))
        .transpose()?;
    configuration.parameter_values = parameter_values;
    Ok(Some(configuration))
}

fn configuration_kind(kind: DescriptorKind) -> FragmentKind {
    match kind {
        DescriptorKind::Test => FragmentKind::QualityCondition,
        DescriptorKind::Transformer => FragmentKind::Transformer,
        DescriptorKind::IssueFilter => FragmentKind::IssueFilter,
    }
}

/// Value with nothing assigned; filter and reference flag are kept.
fn empty_value(record: &ParameterValueRecord) -> ParameterValue {
    match record {
        ParameterValueRecord::Scalar { .. } => ParameterValue::Scalar { value: None },
        ParameterValueRecord::Dataset {
            where_clause,
            used_as_reference_data,
            ..
        } => ParameterValue::Dataset {
            dataset: None,
            filter_expression: where_clause.clone(),
            used_as_reference_data: *used_as_reference_data,
        },
    }
}

fn build_parameter_value(
    cache: &mut ReferenceCache<'_>,
    configuration: &str,
    record: &ParameterValueRecord,
    definition: &ParameterDefinition,
) -> Result<Result<TestParameterValue, SkipCause>, DomainError> {
    let expects_dataset = definition.parameter_type.is_dataset();
    if record.is_dataset() != expects_dataset {
        return Err(DomainError::ParameterKindMismatch {
            configuration: configuration.to_string(),
            parameter: definition.name.clone(),
            expected: if expects_dataset { "dataset" } else { "scalar" },
        });
    }

    let empty = TestParameterValue {
        parameter: definition.name.clone(),
        value: empty_value(record),
        value_source: None,
    };

    // 1. Value computed by a transformer
    if let Some(transformer) = record.transformer() {
        return match cache.get_or_build_transformer(transformer, configuration)? {
            Some(source) => Ok(Ok(empty.with_value_source(source))),
            None if definition.constructor => Ok(Err(SkipCause::Transformer {
                parameter: definition.name.clone(),
                transformer: transformer.to_string(),
            })),
            None => Ok(Ok(empty)),
        };
    }

    match record {
        // 2. Literal
        ParameterValueRecord::Scalar { value, .. } => {
            if let (Some(text), ParameterType::Scalar(data_type)) =
                (value.as_deref(), &definition.parameter_type)
                && !data_type.accepts(text)
            {
                return Err(DomainError::InvalidScalarValue {
                    configuration: configuration.to_string(),
                    parameter: definition.name.clone(),
                    value: text.to_string(),
                    data_type: data_type.to_string(),
                });
            }
            Ok(Ok(TestParameterValue {
                value: ParameterValue::Scalar {
                    value: value.clone(),
                },
                ..empty
            }))
        }

        // 3. Dataset from the catalog
        ParameterValueRecord::Dataset {
            dataset,
            where_clause,
            used_as_reference_data,
            ..
        } => {
            let Some(name) = dataset.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
                if definition.constructor {
                    return Err(DomainError::MissingDatasetValue {
                        configuration: configuration.to_string(),
                        parameter: definition.name.clone(),
                    });
                }
                return Ok(Ok(empty));
            };

            let reference = DatasetReference {
                dataset: name,
                workspace_id: record.workspace_id(),
                configuration,
                parameter: &definition.name,
                constructor: definition.constructor,
            };
            match cache.resolver().resolve(reference)? {
                Resolution::Found(found) => {
                    cache
                        .context()
                        .dataset_validator
                        .validate(&found, definition)
                        .map_err(|message| DomainError::InvalidDataset {
                            configuration: configuration.to_string(),
                            parameter: definition.name.clone(),
                            dataset: found.label(),
                            message,
                        })?;
                    Ok(Ok(TestParameterValue {
                        value: ParameterValue::Dataset {
                            dataset: Some(found),
                            filter_expression: where_clause.clone(),
                            used_as_reference_data: *used_as_reference_data,
                        },
                        ..empty
                    }))
                }
                Resolution::Missing(miss) => {
                    warn!(
                        dataset = %miss.dataset,
                        workspace = ?miss.workspace_id,
                        configuration,
                        "Dataset not found"
                    );
                    let outcome = if miss.drops_configuration {
                        Err(SkipCause::Dataset {
                            parameter: miss.parameter.clone(),
                            dataset: miss.dataset.clone(),
                            workspace_id: miss.workspace_id.clone(),
                        })
                    } else {
                        Ok(empty)
                    };
                    cache.record_miss(miss);
                    Ok(outcome)
                }
            }
        }
    }
}
