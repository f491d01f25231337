// qaspec-core/src/application/index.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::error::DomainError;
use crate::domain::model::{DescriptorKind, FragmentKind, name_key};
use crate::domain::ports::IssueFilterExpressionParser;
use crate::infrastructure::document::{
    CategoryRecord, ConfigurationRecord, DataDictionaryDocument, DescriptorRecord,
    SpecificationRecord, WorkspaceRecord,
};

/// Position of a category in [`DocumentIndex::categories`].
pub type CategoryId = usize;

/// A record plus the category it is nested in, if any.
#[derive(Debug)]
pub struct Located<'a, T> {
    pub record: &'a T,
    pub category: Option<CategoryId>,
}

// Manual impls: a derive would require `T: Copy`.
impl<T> Clone for Located<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Located<'_, T> {}

#[derive(Debug)]
pub struct IndexedCategory<'a> {
    pub record: &'a CategoryRecord,
    /// `Root/Child`, unique per document.
    pub qualified_name: String,
    pub parent: Option<CategoryId>,
}

/// A fragment yielded by [`DocumentIndex::referenced_fragments`].
#[derive(Debug, Clone, Copy)]
pub enum FragmentRef<'a> {
    Specification(Located<'a, SpecificationRecord>),
    Condition(Located<'a, ConfigurationRecord>),
    Transformer(Located<'a, ConfigurationRecord>),
    IssueFilter(Located<'a, ConfigurationRecord>),
}

impl<'a> FragmentRef<'a> {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::Specification(_) => FragmentKind::QualitySpecification,
            Self::Condition(_) => FragmentKind::QualityCondition,
            Self::Transformer(_) => FragmentKind::Transformer,
            Self::IssueFilter(_) => FragmentKind::IssueFilter,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::Specification(s) => &s.record.name,
            Self::Condition(c) | Self::Transformer(c) | Self::IssueFilter(c) => &c.record.name,
        }
    }

    pub fn configuration(&self) -> Option<&'a ConfigurationRecord> {
        match self {
            Self::Specification(_) => None,
            Self::Condition(c) | Self::Transformer(c) | Self::IssueFilter(c) => Some(c.record),
        }
    }
}

/// Name-keyed view over one document. Nested category content is
/// flattened; every fragment remembers its category.
///
/// Building the index never fails: duplicates are kept in the lists (the
/// name tables keep the first one) so that validation can report them.
pub struct DocumentIndex<'a> {
    document: &'a DataDictionaryDocument,
    categories: Vec<IndexedCategory<'a>>,
    specifications: Vec<Located<'a, SpecificationRecord>>,
    conditions: Vec<Located<'a, ConfigurationRecord>>,
    transformers: Vec<Located<'a, ConfigurationRecord>>,
    issue_filters: Vec<Located<'a, ConfigurationRecord>>,
    names: HashMap<(FragmentKind, String), usize>,
}

impl<'a> DocumentIndex<'a> {
    pub fn new(document: &'a DataDictionaryDocument) -> Self {
        let mut index = Self {
            document,
            categories: Vec::new(),
            specifications: Vec::new(),
            conditions: Vec::new(),
            transformers: Vec::new(),
            issue_filters: Vec::new(),
            names: HashMap::new(),
        };

        index.add_content(
            None,
            &document.quality_specifications,
            &document.quality_conditions,
            &document.transformers,
            &document.issue_filters,
        );
        for category in &document.categories {
            index.add_category(category, None);
        }

        index.index_names();
        index
    }

    fn add_category(&mut self, record: &'a CategoryRecord, parent: Option<CategoryId>) {
        let qualified_name = match parent {
            Some(p) => format!("{}/{}", self.categories[p].qualified_name, record.name),
            None => record.name.clone(),
        };
        let id = self.categories.len();
        self.categories.push(IndexedCategory {
            record,
            qualified_name,
            parent,
        });

        self.add_content(
            Some(id),
            &record.quality_specifications,
            &record.quality_conditions,
            &record.transformers,
            &record.issue_filters,
        );
        for child in &record.sub_categories {
            self.add_category(child, Some(id));
        }
    }

    fn add_content(
        &mut self,
        category: Option<CategoryId>,
        specifications: &'a [SpecificationRecord],
        conditions: &'a [ConfigurationRecord],
        transformers: &'a [ConfigurationRecord],
        issue_filters: &'a [ConfigurationRecord],
    ) {
        let locate = |record| Located { record, category };
        self.specifications.extend(specifications.iter().map(locate));
        let locate = |record| Located { record, category };
        self.conditions.extend(conditions.iter().map(locate));
        self.transformers.extend(transformers.iter().map(locate));
        self.issue_filters.extend(issue_filters.iter().map(locate));
    }

    fn index_names(&mut self) {
        let lists: [(FragmentKind, Vec<&str>); 8] = [
            (
                FragmentKind::QualitySpecification,
                self.specifications.iter().map(|s| s.record.name.as_str()).collect(),
            ),
            (
                FragmentKind::QualityCondition,
                self.conditions.iter().map(|c| c.record.name.as_str()).collect(),
            ),
            (
                FragmentKind::Transformer,
                self.transformers.iter().map(|c| c.record.name.as_str()).collect(),
            ),
            (
                FragmentKind::IssueFilter,
                self.issue_filters.iter().map(|c| c.record.name.as_str()).collect(),
            ),
            (
                FragmentKind::TestDescriptor,
                self.document.test_descriptors.iter().map(|d| d.name.as_str()).collect(),
            ),
            (
                FragmentKind::TransformerDescriptor,
                self.document
                    .transformer_descriptors
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect(),
            ),
            (
                FragmentKind::IssueFilterDescriptor,
                self.document
                    .issue_filter_descriptors
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect(),
            ),
            (
                FragmentKind::Workspace,
                self.document.workspaces.iter().map(|w| w.id.as_str()).collect(),
            ),
        ];

        let mut names = HashMap::new();
        for (kind, list) in lists {
            for (position, name) in list.into_iter().enumerate() {
                names.entry((kind, name_key(name))).or_insert(position);
            }
        }
        self.names = names;
    }

    fn position(&self, kind: FragmentKind, name: &str) -> Option<usize> {
        self.names.get(&(kind, name_key(name))).copied()
    }

    // --- ACCESSORS ---

    pub fn document(&self) -> &'a DataDictionaryDocument {
        self.document
    }

    pub fn categories(&self) -> &[IndexedCategory<'a>] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> &IndexedCategory<'a> {
        &self.categories[id]
    }

    pub fn specifications(&self) -> &[Located<'a, SpecificationRecord>] {
        &self.specifications
    }

    pub fn conditions(&self) -> &[Located<'a, ConfigurationRecord>] {
        &self.conditions
    }

    pub fn transformers(&self) -> &[Located<'a, ConfigurationRecord>] {
        &self.transformers
    }

    pub fn issue_filters(&self) -> &[Located<'a, ConfigurationRecord>] {
        &self.issue_filters
    }

    pub fn specification(&self, name: &str) -> Option<Located<'a, SpecificationRecord>> {
        self.position(FragmentKind::QualitySpecification, name)
            .map(|i| self.specifications[i])
    }

    pub fn condition(&self, name: &str) -> Option<Located<'a, ConfigurationRecord>> {
        self.position(FragmentKind::QualityCondition, name)
            .map(|i| self.conditions[i])
    }

    pub fn transformer(&self, name: &str) -> Option<Located<'a, ConfigurationRecord>> {
        self.position(FragmentKind::Transformer, name)
            .map(|i| self.transformers[i])
    }

    pub fn issue_filter(&self, name: &str) -> Option<Located<'a, ConfigurationRecord>> {
        self.position(FragmentKind::IssueFilter, name)
            .map(|i| self.issue_filters[i])
    }

    pub fn descriptors(&self, kind: DescriptorKind) -> &'a [DescriptorRecord] {
        match kind {
            DescriptorKind::Test => &self.document.test_descriptors,
            DescriptorKind::Transformer => &self.document.transformer_descriptors,
            DescriptorKind::IssueFilter => &self.document.issue_filter_descriptors,
        }
    }

    pub fn descriptor(&self, kind: DescriptorKind, name: &str) -> Option<&'a DescriptorRecord> {
        self.position(kind.fragment_kind(), name)
            .map(|i| &self.descriptors(kind)[i])
    }

    pub fn workspaces(&self) -> &'a [WorkspaceRecord] {
        &self.document.workspaces
    }

    pub fn workspace(&self, id: &str) -> Option<&'a WorkspaceRecord> {
        self.position(FragmentKind::Workspace, id)
            .map(|i| &self.document.workspaces[i])
    }

    // --- TRAVERSAL ---

    /// Depth-first walk yielding `root` and everything it transitively
    /// references, each fragment once, in discovery order. A fragment met
    /// again on the current path is a cycle.
    pub fn referenced_fragments(
        &self,
        root: FragmentRef<'a>,
        parser: &dyn IssueFilterExpressionParser,
    ) -> Result<Vec<FragmentRef<'a>>, DomainError> {
        let mut walk = Walk {
            index: self,
            parser,
            visited: HashSet::new(),
            path: Vec::new(),
            found: Vec::new(),
        };
        walk.visit(root)?;
        Ok(walk.found)
    }

    /// Workspace ids used by dataset values of the fragments reachable from
    /// `roots`, keyed by [`name_key`], with the id as first written.
    pub fn referenced_workspace_ids(
        &self,
        roots: &[FragmentRef<'a>],
        parser: &dyn IssueFilterExpressionParser,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        let mut ids = BTreeMap::new();
        let mut seen = HashSet::new();
        for root in roots {
            for fragment in self.referenced_fragments(*root, parser)? {
                if !seen.insert((fragment.kind(), name_key(fragment.name()))) {
                    continue;
                }
                let Some(configuration) = fragment.configuration() else {
                    continue;
                };
                for id in configuration.parameters.iter().filter_map(|p| p.workspace_id()) {
                    ids.entry(name_key(id)).or_insert_with(|| id.trim().to_string());
                }
            }
        }
        Ok(ids)
    }
}

struct Walk<'i, 'a> {
    index: &'i DocumentIndex<'a>,
    parser: &'i dyn IssueFilterExpressionParser,
    visited: HashSet<(FragmentKind, String)>,
    path: Vec<((FragmentKind, String), &'a str)>,
    found: Vec<FragmentRef<'a>>,
}

impl<'a> Walk<'_, 'a> {
    fn visit(&mut self, fragment: FragmentRef<'a>) -> Result<(), DomainError> {
        let referencing = fragment.name();
        let key = (fragment.kind(), name_key(referencing));
        if let Some(start) = self.path.iter().position(|(k, _)| *k == key) {
            let mut cycle: Vec<&str> = self.path[start..].iter().map(|(_, name)| *name).collect();
            cycle.push(referencing);
            return Err(DomainError::CyclicReference(cycle.join(" -> ")));
        }
        if !self.visited.insert(key.clone()) {
            return Ok(());
        }

        self.found.push(fragment);
        self.path.push((key, referencing));

        match fragment {
            FragmentRef::Specification(spec) => {
                for element in &spec.record.elements {
                    let condition = self.index.condition(&element.condition).ok_or_else(|| {
                        unknown(FragmentKind::QualityCondition, &element.condition, referencing)
                    })?;
                    self.visit(FragmentRef::Condition(condition))?;
                }
            }
            FragmentRef::Condition(condition) => {
                self.visit_transformers(condition.record)?;
                if let Some(expression) = &condition.record.issue_filter_expression {
                    for name in self.parser.referenced_filters(expression)? {
                        let filter = self.index.issue_filter(&name).ok_or_else(|| {
                            unknown(FragmentKind::IssueFilter, &name, referencing)
                        })?;
                        self.visit(FragmentRef::IssueFilter(filter))?;
                    }
                }
            }
            FragmentRef::Transformer(c) | FragmentRef::IssueFilter(c) => {
                self.visit_transformers(c.record)?;
            }
        }

        self.path.pop();
        Ok(())
    }

    fn visit_transformers(&mut self, record: &'a ConfigurationRecord) -> Result<(), DomainError> {
        for name in record.transformer_references() {
            let transformer = self
                .index
                .transformer(name)
                .ok_or_else(|| unknown(FragmentKind::Transformer, name, &record.name))?;
            self.visit(FragmentRef::Transformer(transformer))?;
        }
        Ok(())
    }
}

fn unknown(kind: FragmentKind, name: &str, referenced_by: &str) -> DomainError {
    DomainError::UnknownReference {
        kind,
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::document::parse_document;
    use crate::infrastructure::expression::BooleanExpressionParser;
    use anyhow::Result;

    const DOCUMENT: &str = r#"
workspaces:
  - { id: WS1, model_name: Model1 }
  - { id: WS2, model_name: Model2 }
categories:
  - name: Network
    sub_categories:
      - name: Roads
        quality_conditions:
          - name: C1
            descriptor: QaMinLength
            issue_filter_expression: "IF1 OR IF1"
            parameters:
              - { type: dataset, parameter: featureClass, transformer: T2 }
quality_specifications:
  - name: S1
    elements:
      - condition: C1
      - condition: c1
transformers:
  - name: T1
    descriptor: TrOnly
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }
  - name: T2
    descriptor: TrOnly
    parameters:
      - { type: dataset, parameter: featureClass, transformer: T1 }
      - { type: dataset, parameter: other, transformer: t1 }
issue_filters:
  - name: IF1
    descriptor: IfAll
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Rivers, workspace_id: ws1 }
  - name: IF2
    descriptor: IfAll
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Lakes, workspace_id: WS2 }
"#;

    #[test]
    fn test_nested_content_is_located() -> Result<()> {
        let document = parse_document(DOCUMENT)?;
        let index = DocumentIndex::new(&document);

        assert_eq!(index.categories().len(), 2);
        let c1 = index.condition("c1").unwrap();
        let category = index.category(c1.category.unwrap());
        assert_eq!(category.qualified_name, "Network/Roads");
        assert!(index.specification("S1").unwrap().category.is_none());
        Ok(())
    }

    #[test]
    fn test_referenced_fragments_visit_each_once() -> Result<()> {
        let document = parse_document(DOCUMENT)?;
        let index = DocumentIndex::new(&document);
        let root = FragmentRef::Specification(index.specification("S1").unwrap());

        let found = index.referenced_fragments(root, &BooleanExpressionParser)?;
        let names: Vec<&str> = found.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["S1", "C1", "T2", "T1", "IF1"]);
        Ok(())
    }

    #[test]
    fn test_referenced_workspace_ids_only_reachable() -> Result<()> {
        let document = parse_document(DOCUMENT)?;
        let index = DocumentIndex::new(&document);
        let root = FragmentRef::Specification(index.specification("S1").unwrap());

        let ids = index.referenced_workspace_ids(&[root], &BooleanExpressionParser)?;
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get("ws1").map(String::as_str), Some("WS1"));
        Ok(())
    }

    #[test]
    fn test_cycle_is_reported_with_path() -> Result<()> {
        let document = parse_document(
            r#"
transformers:
  - name: A
    descriptor: Tr
    parameters: [{ type: dataset, parameter: p, transformer: B }]
  - name: B
    descriptor: Tr
    parameters: [{ type: dataset, parameter: p, transformer: A }]
"#,
        )?;
        let index = DocumentIndex::new(&document);
        let root = FragmentRef::Transformer(index.transformer("A").unwrap());

        match index.referenced_fragments(root, &BooleanExpressionParser) {
            Err(DomainError::CyclicReference(path)) => assert_eq!(path, "A -> B -> A"),
            other => panic!("expected cycle, got {:?}", other.map(|f| f.len())),
        }
        Ok(())
    }

    #[test]
    fn test_unknown_transformer_reference() -> Result<()> {
        let document = parse_document(
            "transformers:\n  - name: A\n    descriptor: Tr\n    parameters: [{ type: dataset, parameter: p, transformer: Z }]\n",
        )?;
        let index = DocumentIndex::new(&document);
        let root = FragmentRef::Transformer(index.transformer("A").unwrap());
        let err = index
            .referenced_fragments(root, &BooleanExpressionParser)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownReference { .. }));
        Ok(())
    }
}
