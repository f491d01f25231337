// qaspec-core/src/application/validation.rs

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::index::{DocumentIndex, IndexedCategory, Located};
use crate::domain::error::DomainError;
use crate::domain::graph::GraphSolver;
use crate::domain::model::{FragmentKind, name_key};
use crate::infrastructure::document::{ConfigurationRecord, DataDictionaryDocument};

/// Structural checks that run before any reference is resolved: unique
/// names per fragment kind, globally unique uuids, category containment
/// flags and an acyclic transformer graph.
#[instrument(skip_all)]
pub fn validate_document(document: &DataDictionaryDocument) -> Result<(), DomainError> {
    validate_index(&DocumentIndex::new(document))
}

pub fn validate_index(index: &DocumentIndex<'_>) -> Result<(), DomainError> {
    check_unique_names(index)?;
    check_unique_uuids(index)?;
    check_category_contents(index)?;
    check_acyclic_transformers(index)?;
    debug!("Document structure is valid");
    Ok(())
}

fn unique<'n>(kind: FragmentKind, names: impl IntoIterator<Item = &'n str>) -> Result<(), DomainError> {
    let mut seen = HashMap::new();
    for name in names {
        if seen.insert(name_key(name), name).is_some() {
            return Err(DomainError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn configuration_names<'n>(
    list: &'n [Located<'_, ConfigurationRecord>],
) -> impl Iterator<Item = &'n str> {
    list.iter().map(|c| c.record.name.as_str())
}

fn check_unique_names(index: &DocumentIndex<'_>) -> Result<(), DomainError> {
    let document = index.document();

    unique(
        FragmentKind::Workspace,
        document.workspaces.iter().map(|w| w.id.as_str()),
    )?;
    unique(
        FragmentKind::Category,
        index.categories().iter().map(|c| c.qualified_name.as_str()),
    )?;
    unique(
        FragmentKind::QualitySpecification,
        index.specifications().iter().map(|s| s.record.name.as_str()),
    )?;
    unique(
        FragmentKind::QualityCondition,
        configuration_names(index.conditions()),
    )?;
    unique(
        FragmentKind::Transformer,
        configuration_names(index.transformers()),
    )?;
    unique(
        FragmentKind::IssueFilter,
        configuration_names(index.issue_filters()),
    )?;
    unique(
        FragmentKind::TestDescriptor,
        document.test_descriptors.iter().map(|d| d.name.as_str()),
    )?;
    unique(
        FragmentKind::TransformerDescriptor,
        document.transformer_descriptors.iter().map(|d| d.name.as_str()),
    )?;
    unique(
        FragmentKind::IssueFilterDescriptor,
        document.issue_filter_descriptors.iter().map(|d| d.name.as_str()),
    )?;
    Ok(())
}

fn check_unique_uuids(index: &DocumentIndex<'_>) -> Result<(), DomainError> {
    let mut owners: Vec<(Uuid, String)> = Vec::new();

    for category in index.categories() {
        if let Some(uuid) = category.record.uuid {
            owners.push((uuid, format!("category '{}'", category.qualified_name)));
        }
    }
    for spec in index.specifications() {
        if let Some(uuid) = spec.record.uuid {
            owners.push((uuid, format!("quality specification '{}'", spec.record.name)));
        }
    }
    let configurations = [
        (FragmentKind::QualityCondition, index.conditions()),
        (FragmentKind::Transformer, index.transformers()),
        (FragmentKind::IssueFilter, index.issue_filters()),
    ];
    for (kind, list) in configurations {
        for located in list {
            let record = located.record;
            if let Some(uuid) = record.uuid {
                owners.push((uuid, format!("{} '{}'", kind, record.name)));
            }
            if let Some(uuid) = record.version_uuid {
                owners.push((uuid, format!("{} '{}' (version)", kind, record.name)));
            }
        }
    }

    let mut seen: HashMap<Uuid, String> = HashMap::new();
    for (uuid, owner) in owners {
        if let Some(first) = seen.get(&uuid) {
            return Err(DomainError::DuplicateUuid {
                uuid: uuid.to_string(),
                first: first.clone(),
                second: owner,
            });
        }
        seen.insert(uuid, owner);
    }
    Ok(())
}

fn check_category_contents(index: &DocumentIndex<'_>) -> Result<(), DomainError> {
    let violation = |category: &IndexedCategory<'_>, content: &str| {
        DomainError::CategoryContentViolation {
            category: category.qualified_name.clone(),
            content: content.to_string(),
        }
    };

    for category in index.categories() {
        let record = category.record;
        if !record.can_contain_quality_conditions
            && (!record.quality_conditions.is_empty()
                || !record.transformers.is_empty()
                || !record.issue_filters.is_empty())
        {
            return Err(violation(category, "quality conditions"));
        }
        if !record.can_contain_quality_specifications && !record.quality_specifications.is_empty()
        {
            return Err(violation(category, "quality specifications"));
        }
        if !record.can_contain_sub_categories && !record.sub_categories.is_empty() {
            return Err(violation(category, "sub-categories"));
        }
    }
    Ok(())
}

/// Transformers are the only fragments that can reference their own kind,
/// so checking them is enough to rule out cycles.
fn check_acyclic_transformers(index: &DocumentIndex<'_>) -> Result<(), DomainError> {
    let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for located in index.transformers() {
        let dependencies = located
            .record
            .transformer_references()
            .filter_map(|name| index.transformer(name))
            .map(|t| t.record.name.clone())
            .collect();
        graph.insert(located.record.name.clone(), dependencies);
    }
    GraphSolver::plan_layers(&graph).map(|_| ())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::document::parse_document;
    use anyhow::Result;

    fn validate(yaml: &str) -> Result<(), DomainError> {
        let document = parse_document(yaml).unwrap();
        validate_document(&document)
    }

    #[test]
    fn test_duplicate_condition_names_fail() {
        let err = validate(
            r#"
quality_conditions:
  - { name: QC1, descriptor: QaMinLength }
categories:
  - name: Roads
    quality_conditions:
      - { name: qc1, descriptor: QaMinLength }
"#,
        )
        .unwrap_err();

        match err {
            DomainError::DuplicateName { kind, name } => {
                assert_eq!(kind, FragmentKind::QualityCondition);
                assert_eq!(name, "qc1");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_same_name_in_different_kinds_is_fine() -> Result<()> {
        validate(
            r#"
quality_conditions:
  - { name: X, descriptor: D }
transformers:
  - { name: X, descriptor: D }
test_descriptors:
  - { name: D, implementation: QaMinLength }
transformer_descriptors:
  - { name: D, implementation: TrOnly }
"#,
        )?;
        Ok(())
    }

    #[test]
    fn test_categories_are_unique_by_qualified_name() -> Result<()> {
        validate(
            r#"
categories:
  - name: A
    sub_categories: [{ name: Common }]
  - name: B
    sub_categories: [{ name: Common }]
"#,
        )?;

        let err = validate("categories:\n  - name: A\n  - name: a\n").unwrap_err();
        assert!(matches!(err, DomainError::DuplicateName { kind: FragmentKind::Category, .. }));
        Ok(())
    }

    #[test]
    fn test_duplicate_uuid_across_kinds() {
        let err = validate(
            r#"
quality_specifications:
  - { name: S1, uuid: 6a1f3c2e-8d7b-4c55-9a0e-1b2c3d4e5f60 }
quality_conditions:
  - { name: C1, descriptor: D, version_uuid: 6a1f3c2e-8d7b-4c55-9a0e-1b2c3d4e5f60 }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUuid { .. }));
        assert!(err.to_string().contains("quality specification 'S1'"));
    }

    #[test]
    fn test_category_containment_flags() {
        let err = validate(
            r#"
categories:
  - name: Folder
    can_contain_quality_conditions: false
    transformers:
      - { name: T1, descriptor: TrOnly }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::CategoryContentViolation { .. }));
    }

    #[test]
    fn test_transformer_cycle_rejected() {
        let err = validate(
            r#"
transformers:
  - name: T1
    descriptor: Tr
    parameters: [{ type: dataset, parameter: p, transformer: T2 }]
  - name: T2
    descriptor: Tr
    parameters: [{ type: dataset, parameter: p, transformer: T1 }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::CyclicReference(_)));
    }
}
