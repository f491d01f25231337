// qaspec-core/src/application/cache.rs

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::application::builder;
use crate::application::index::{CategoryId, DocumentIndex, FragmentRef, Located};
use crate::application::resolver::{
    DatasetMiss, DatasetResolver, ModelsByWorkspaceId, SkippedConfiguration,
};
use crate::domain::error::DomainError;
use crate::domain::model::{
    DataQualityCategory, DescriptorKind, FragmentKind, InstanceDescriptor,
    IssueFilterConfiguration, QualityCondition, QualitySpecification, TransformerConfiguration,
    name_key,
};
use crate::domain::ports::{
    DatasetCatalog, DatasetValidator, IssueFilterExpressionParser, SignatureProvider,
};
use crate::infrastructure::document::{ConfigurationRecord, SpecificationRecord};

/// Ports and settings one conversion resolves against.
pub struct ResolutionContext<'a> {
    pub signatures: &'a dyn SignatureProvider,
    pub catalog: &'a dyn DatasetCatalog,
    pub expressions: &'a dyn IssueFilterExpressionParser,
    pub dataset_validator: &'a dyn DatasetValidator,
    pub models: ModelsByWorkspaceId,
    pub tolerant: bool,
}

type Memo<T> = HashMap<String, Option<Arc<T>>>;

/// Everything built during one conversion, sorted by name.
#[derive(Debug, Default)]
pub struct CacheContents {
    pub descriptors: Vec<Arc<InstanceDescriptor>>,
    pub categories: Vec<Arc<DataQualityCategory>>,
    pub conditions: Vec<Arc<QualityCondition>>,
    pub transformers: Vec<Arc<TransformerConfiguration>>,
    pub issue_filters: Vec<Arc<IssueFilterConfiguration>>,
    pub misses: Vec<DatasetMiss>,
    pub skipped: Vec<SkippedConfiguration>,
}

/// Memoizing front of the builder for one conversion.
///
/// Each fragment is built at most once; later requests get the same `Arc`.
/// Fragments dropped in tolerant mode are remembered as `None`. A fragment
/// requested while it is still being built is a cycle.
pub struct ReferenceCache<'a> {
    index: DocumentIndex<'a>,
    context: ResolutionContext<'a>,
    descriptors: HashMap<(DescriptorKind, String), Arc<InstanceDescriptor>>,
    categories: HashMap<CategoryId, Arc<DataQualityCategory>>,
    transformers: Memo<TransformerConfiguration>,
    issue_filters: Memo<IssueFilterConfiguration>,
    conditions: Memo<QualityCondition>,
    in_progress: Vec<(FragmentKind, String)>,
    misses: Vec<DatasetMiss>,
    skipped: Vec<SkippedConfiguration>,
}

impl<'a> ReferenceCache<'a> {
    pub fn new(index: DocumentIndex<'a>, context: ResolutionContext<'a>) -> Self {
        Self {
            index,
            context,
            descriptors: HashMap::new(),
            categories: HashMap::new(),
            transformers: HashMap::new(),
            issue_filters: HashMap::new(),
            conditions: HashMap::new(),
            in_progress: Vec::new(),
            misses: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn index(&self) -> &DocumentIndex<'a> {
        &self.index
    }

    pub fn context(&self) -> &ResolutionContext<'a> {
        &self.context
    }

    pub fn resolver(&self) -> DatasetResolver<'_> {
        DatasetResolver::new(&self.context.models, self.context.catalog, self.context.tolerant)
    }

    pub fn record_miss(&mut self, miss: DatasetMiss) {
        self.misses.push(miss);
    }

    pub fn misses(&self) -> &[DatasetMiss] {
        &self.misses
    }

    pub fn record_skip(&mut self, skipped: SkippedConfiguration) {
        self.skipped.push(skipped);
    }

    pub fn skipped(&self) -> &[SkippedConfiguration] {
        &self.skipped
    }

    /// See [`DocumentIndex::referenced_fragments`].
    pub fn referenced_fragments(
        &self,
        root: FragmentRef<'a>,
    ) -> Result<Vec<FragmentRef<'a>>, DomainError> {
        self.index.referenced_fragments(root, self.context.expressions)
    }

    // --- DESCRIPTORS & CATEGORIES ---

    pub fn get_or_build_descriptor(
        &mut self,
        kind: DescriptorKind,
        name: &str,
        referenced_by: &str,
    ) -> Result<Arc<InstanceDescriptor>, DomainError> {
        let key = (kind, name_key(name));
        if let Some(descriptor) = self.descriptors.get(&key) {
            return Ok(Arc::clone(descriptor));
        }

        let record = self
            .index
            .descriptor(kind, name)
            .ok_or_else(|| DomainError::UnknownReference {
                kind: kind.fragment_kind(),
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;
        let descriptor = Arc::new(builder::build_descriptor(record, kind));
        self.descriptors.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get_or_build_category(
        &mut self,
        id: CategoryId,
    ) -> Result<Arc<DataQualityCategory>, DomainError> {
        if let Some(category) = self.categories.get(&id) {
            return Ok(Arc::clone(category));
        }

        let parent = match self.index.category(id).parent {
            Some(parent_id) => Some(self.get_or_build_category(parent_id)?),
            None => None,
        };
        let category = Arc::new(builder::build_category(self, id, parent)?);
        self.categories.insert(id, Arc::clone(&category));
        Ok(category)
    }

    // --- CONFIGURATIONS ---

    pub fn get_or_build_transformer(
        &mut self,
        name: &str,
        referenced_by: &str,
    ) -> Result<Option<Arc<TransformerConfiguration>>, DomainError> {
        self.get_or_build(
            FragmentKind::Transformer,
            name,
            referenced_by,
            Self::transformer_memo,
            DocumentIndex::transformer,
            builder::build_transformer,
        )
    }

    pub fn get_or_build_issue_filter(
        &mut self,
        name: &str,
        referenced_by: &str,
    ) -> Result<Option<Arc<IssueFilterConfiguration>>, DomainError> {
        self.get_or_build(
            FragmentKind::IssueFilter,
            name,
            referenced_by,
            Self::issue_filter_memo,
            DocumentIndex::issue_filter,
            builder::build_issue_filter,
        )
    }

    pub fn get_or_build_condition(
        &mut self,
        name: &str,
        referenced_by: &str,
    ) -> Result<Option<Arc<QualityCondition>>, DomainError> {
        self.get_or_build(
            FragmentKind::QualityCondition,
            name,
            referenced_by,
            Self::condition_memo,
            DocumentIndex::condition,
            builder::build_condition,
        )
    }

    /// Specifications are roots and are not memoized.
    pub fn build_specification(
        &mut self,
        located: Located<'a, SpecificationRecord>,
    ) -> Result<QualitySpecification, DomainError> {
        builder::build_specification(self, located)
    }

    fn transformer_memo(&mut self) -> &mut Memo<TransformerConfiguration> {
        &mut self.transformers
    }

    fn issue_filter_memo(&mut self) -> &mut Memo<IssueFilterConfiguration> {
        &mut self.issue_filters
    }

    fn condition_memo(&mut self) -> &mut Memo<QualityCondition> {
        &mut self.conditions
    }

    fn get_or_build<T>(
        &mut self,
        kind: FragmentKind,
        name: &str,
        referenced_by: &str,
        memo: fn(&mut Self) -> &mut Memo<T>,
        locate: fn(&DocumentIndex<'a>, &str) -> Option<Located<'a, ConfigurationRecord>>,
        build: fn(&mut Self, Located<'a, ConfigurationRecord>) -> Result<Option<T>, DomainError>,
    ) -> Result<Option<Arc<T>>, DomainError> {
        let key = name_key(name);
        if let Some(built) = memo(self).get(&key) {
            debug!(%kind, fragment = name, dropped = built.is_none(), "Reusing built fragment");
            return Ok(built.clone());
        }

        let located = locate(&self.index, name).ok_or_else(|| DomainError::UnknownReference {
            kind,
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })?;

        if let Some(start) = self
            .in_progress
            .iter()
            .position(|(k, n)| *k == kind && name_key(n) == key)
        {
            let mut path: Vec<&str> = self.in_progress[start..]
                .iter()
                .map(|(_, n)| n.as_str())
                .collect();
            path.push(&located.record.name);
            return Err(DomainError::CyclicReference(path.join(" -> ")));
        }

        self.in_progress.push((kind, located.record.name.clone()));
        let result = build(self, located);
        self.in_progress.pop();

        let built = result?.map(Arc::new);
        memo(self).insert(key, built.clone());
        Ok(built)
    }

    pub fn into_contents(self) -> CacheContents {
        fn built<T>(memo: Memo<T>) -> Vec<Arc<T>> {
            memo.into_values().flatten().collect()
        }

        let mut descriptors: Vec<_> = self.descriptors.into_values().collect();
        descriptors.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        let mut categories: Vec<_> = self.categories.into_values().collect();
        categories.sort_by_key(|c| c.qualified_name());
        let mut conditions = built(self.conditions);
        conditions.sort_by(|a, b| a.name.cmp(&b.name));
        let mut transformers = built(self.transformers);
        transformers.sort_by(|a, b| a.name.cmp(&b.name));
        let mut issue_filters = built(self.issue_filters);
        issue_filters.sort_by(|a, b| a.name.cmp(&b.name));

        CacheContents {
            descriptors,
            categories,
            conditions,
            transformers,
            issue_filters,
            misses: self.misses,
            skipped: self.skipped,
        }
    }
}
