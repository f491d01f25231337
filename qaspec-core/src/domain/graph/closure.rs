// qaspec-core/src/domain/graph/closure.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::model::{
    DataQualityCategory, Dataset, InstanceConfiguration, InstanceDescriptor,
    IssueFilterConfiguration, QualityCondition, QualitySpecification, TransformerConfiguration,
};

/// Everything reachable from a set of live specifications.
///
/// Identity is pointer identity: a transformer shared by two conditions is
/// collected once. Collections keep discovery order.
#[derive(Debug, Default)]
pub struct ReferenceClosure {
    pub conditions: Vec<Arc<QualityCondition>>,
    pub transformers: Vec<Arc<TransformerConfiguration>>,
    pub issue_filters: Vec<Arc<IssueFilterConfiguration>>,
    seen_conditions: HashSet<*const QualityCondition>,
    seen_transformers: HashSet<*const TransformerConfiguration>,
    seen_issue_filters: HashSet<*const IssueFilterConfiguration>,
}

impl ReferenceClosure {
    pub fn from_specifications<'a>(
        specifications: impl IntoIterator<Item = &'a QualitySpecification>,
    ) -> Self {
        let mut closure = Self::default();
        for specification in specifications {
            for element in &specification.elements {
                closure.add_condition(&element.condition);
            }
        }
        closure
    }

    pub fn from_conditions<'a>(
        conditions: impl IntoIterator<Item = &'a Arc<QualityCondition>>,
    ) -> Self {
        let mut closure = Self::default();
        for condition in conditions {
            closure.add_condition(condition);
        }
        closure
    }

    pub fn add_condition(&mut self, condition: &Arc<QualityCondition>) {
        if !self.seen_conditions.insert(Arc::as_ptr(condition)) {
            return;
        }
        self.conditions.push(Arc::clone(condition));
        self.add_value_sources(&condition.configuration);

        for filter in &condition.issue_filters {
            if self.seen_issue_filters.insert(Arc::as_ptr(filter)) {
                self.issue_filters.push(Arc::clone(filter));
                self.add_value_sources(&filter.configuration);
            }
        }
    }

    fn add_value_sources(&mut self, configuration: &InstanceConfiguration) {
        // Iterative walk; chains of transformers can be long
        let mut pending: Vec<Arc<TransformerConfiguration>> =
            configuration.value_sources().cloned().collect();
        pending.reverse();

        while let Some(transformer) = pending.pop() {
            if !self.seen_transformers.insert(Arc::as_ptr(&transformer)) {
                continue;
            }
            let mut nested: Vec<_> = transformer.value_sources().cloned().collect();
            nested.reverse();
            self.transformers.push(transformer);
            pending.extend(nested);
        }
    }

    /// Every configuration in the closure, conditions first.
    pub fn configurations(&self) -> impl Iterator<Item = &InstanceConfiguration> {
        self.conditions
            .iter()
            .map(|c| &c.configuration)
            .chain(self.transformers.iter().map(|t| &t.configuration))
            .chain(self.issue_filters.iter().map(|f| &f.configuration))
    }

    /// Descriptors used by the closure, deduplicated by identity.
    pub fn descriptors(&self) -> Vec<Arc<InstanceDescriptor>> {
        let mut seen = HashSet::new();
        self.configurations()
            .filter(|c| seen.insert(Arc::as_ptr(&c.descriptor)))
            .map(|c| Arc::clone(&c.descriptor))
            .collect()
    }

    /// Datasets assigned to any parameter of the closure.
    pub fn datasets(&self) -> Vec<Arc<Dataset>> {
        let mut seen = HashSet::new();
        self.configurations()
            .flat_map(|c| c.datasets())
            .filter(|d| seen.insert(Arc::as_ptr(d)))
            .cloned()
            .collect()
    }

    /// Categories of the closure and of `specifications`, including all
    /// ancestors.
    pub fn categories<'a>(
        &self,
        specifications: impl IntoIterator<Item = &'a QualitySpecification>,
    ) -> Vec<Arc<DataQualityCategory>> {
        let direct = specifications
            .into_iter()
            .filter_map(|s| s.category.as_ref())
            .chain(self.configurations().filter_map(|c| c.category.as_ref()));

        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for category in direct {
            let chain = std::iter::once(category).chain(category.ancestors());
            for member in chain {
                if seen.insert(Arc::as_ptr(member)) {
                    categories.push(Arc::clone(member));
                }
            }
        }
        categories
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::{
        DescriptorKind, Implementation, QualitySpecificationElement, TestParameterValue,
    };

    fn descriptor(name: &str, kind: DescriptorKind) -> Arc<InstanceDescriptor> {
        Arc::new(InstanceDescriptor::new(
            name,
            kind,
            Implementation::new(name, 0),
        ))
    }

    fn transformer(
        name: &str,
        source: Option<&Arc<TransformerConfiguration>>,
    ) -> Arc<TransformerConfiguration> {
        let mut configuration =
            InstanceConfiguration::new(name, descriptor("TrOnly", DescriptorKind::Transformer));
        let mut value = TestParameterValue::dataset("featureClass", None);
        if let Some(source) = source {
            value = value.with_value_source(Arc::clone(source));
        }
        configuration.parameter_values.push(value);
        Arc::new(TransformerConfiguration { configuration })
    }

    fn condition(name: &str, source: &Arc<TransformerConfiguration>) -> Arc<QualityCondition> {
        let mut configuration =
            InstanceConfiguration::new(name, descriptor("QaMinLength", DescriptorKind::Test));
        configuration
            .parameter_values
            .push(TestParameterValue::dataset("featureClass", None).with_value_source(Arc::clone(source)));
        Arc::new(QualityCondition::new(configuration))
    }

    #[test]
    fn test_shared_transformer_collected_once() {
        let t1 = transformer("T1", None);
        let t2 = transformer("T2", Some(&t1));
        let c1 = condition("C1", &t2);
        let c2 = condition("C2", &t1);

        let mut spec = QualitySpecification::new("S1");
        spec.elements.push(QualitySpecificationElement::new(Arc::clone(&c1)));
        spec.elements.push(QualitySpecificationElement::new(Arc::clone(&c2)));
        spec.elements.push(QualitySpecificationElement::new(c1));

        let closure = ReferenceClosure::from_specifications([&spec]);
        assert_eq!(closure.conditions.len(), 2);
        let names: Vec<_> = closure.transformers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T2", "T1"]);
    }

    #[test]
    fn test_categories_include_ancestors() {
        let root = Arc::new(DataQualityCategory::new("Root"));
        let mut child = DataQualityCategory::new("Child");
        child.parent = Some(Arc::clone(&root));
        let child = Arc::new(child);

        let mut spec = QualitySpecification::new("S1");
        spec.category = Some(Arc::clone(&child));

        let closure = ReferenceClosure::default();
        let categories = closure.categories([&spec]);
        assert_eq!(categories.len(), 2);
        assert!(Arc::ptr_eq(&categories[0], &child));
        assert!(Arc::ptr_eq(&categories[1], &root));
    }
}
