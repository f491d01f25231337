// qaspec-core/src/domain/model/mod.rs

pub mod category;
pub mod configuration;
pub mod dataset;
pub mod descriptor;
pub mod fragment;
pub mod specification;

pub use category::DataQualityCategory;
pub use configuration::{
    AuditInfo, InstanceConfiguration, IssueFilterConfiguration, ParameterValue, QualityCondition,
    TestParameterValue, TransformerConfiguration,
};
pub use dataset::{Dataset, DatasetType, GeometryType, Model, unqualified_name};
pub use descriptor::{
    DatasetConstraint, DescriptorKind, Implementation, InstanceDescriptor, ParameterDefinition,
    ParameterSignature, ParameterType, ScalarType,
};
pub use fragment::{FragmentKind, name_key};
pub use specification::{QualitySpecification, QualitySpecificationElement};
