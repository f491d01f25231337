// qaspec-core/src/domain/model/fragment.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of named fragments an exchange document is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Workspace,
    Category,
    QualitySpecification,
    QualityCondition,
    Transformer,
    IssueFilter,
    TestDescriptor,
    TransformerDescriptor,
    IssueFilterDescriptor,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Category => "category",
            Self::QualitySpecification => "quality specification",
            Self::QualityCondition => "quality condition",
            Self::Transformer => "transformer",
            Self::IssueFilter => "issue filter",
            Self::TestDescriptor => "test descriptor",
            Self::TransformerDescriptor => "transformer descriptor",
            Self::IssueFilterDescriptor => "issue filter descriptor",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookup key for fragment names. Names are compared case-insensitively.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
