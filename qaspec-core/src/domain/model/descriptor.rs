// qaspec-core/src/domain/model/descriptor.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::model::configuration::AuditInfo;
use crate::domain::model::dataset::{DatasetType, GeometryType};
use crate::domain::model::fragment::{FragmentKind, name_key};

/// The closed set of pluggable algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    Test,
    Transformer,
    IssueFilter,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Transformer => "transformer",
            Self::IssueFilter => "issue filter",
        }
    }

    pub fn fragment_kind(&self) -> FragmentKind {
        match self {
            Self::Test => FragmentKind::TestDescriptor,
            Self::Transformer => FragmentKind::TransformerDescriptor,
            Self::IssueFilter => FragmentKind::IssueFilterDescriptor,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of an implementation inside the capability registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Implementation {
    pub type_name: String,
    #[serde(default)]
    pub constructor_id: u32,
}

impl Implementation {
    pub fn new(type_name: impl Into<String>, constructor_id: u32) -> Self {
        Self {
            type_name: type_name.into(),
            constructor_id,
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.constructor_id)
    }
}

/// Named reference to an implementation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDescriptor {
    pub name: String,
    pub kind: DescriptorKind,
    pub implementation: Implementation,
    pub description: Option<String>,
    // Defaults applied to conditions of test descriptors
    pub stop_on_error: bool,
    pub allow_errors: bool,
    pub execution_priority: Option<i32>,
    pub audit: AuditInfo,
}

impl InstanceDescriptor {
    pub fn new(name: impl Into<String>, kind: DescriptorKind, implementation: Implementation) -> Self {
        Self {
            name: name.into(),
            kind,
            implementation,
            description: None,
            stop_on_error: false,
            allow_errors: false,
            execution_priority: None,
            audit: AuditInfo::default(),
        }
    }
}

// =============================================================================
//  PARAMETER SIGNATURE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Integer,
    Double,
    #[default]
    String,
    DateTime,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
            Self::DateTime => "date_time",
        }
    }

    /// Whether `value` is a valid invariant-culture literal of this type.
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::Boolean => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Double => value.parse::<f64>().is_ok(),
            Self::String => true,
            Self::DateTime => {
                DateTime::parse_from_rfc3339(value).is_ok()
                    || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
                    || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Restricts which catalog datasets a dataset parameter accepts.
/// Empty lists accept anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetConstraint {
    pub dataset_types: Vec<DatasetType>,
    pub geometry_types: Vec<GeometryType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    Scalar(ScalarType),
    Dataset(DatasetConstraint),
}

impl ParameterType {
    pub fn is_dataset(&self) -> bool {
        matches!(self, Self::Dataset(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub name: String,
    pub parameter_type: ParameterType,
    /// Constructor parameters are mandatory; the others are optional properties.
    pub constructor: bool,
    pub description: Option<String>,
}

impl ParameterDefinition {
    pub fn scalar(name: impl Into<String>, data_type: ScalarType, constructor: bool) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType::Scalar(data_type),
            constructor,
            description: None,
        }
    }

    pub fn dataset(name: impl Into<String>, constraint: DatasetConstraint, constructor: bool) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType::Dataset(constraint),
            constructor,
            description: None,
        }
    }
}

/// Ordered parameter declarations of one implementation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterSignature {
    parameters: Vec<ParameterDefinition>,
}

impl ParameterSignature {
    pub fn new(parameters: Vec<ParameterDefinition>) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    pub fn find(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters
            .iter()
            .find(|p| name_key(&p.name) == name_key(name))
    }
}
