// qaspec-core/src/infrastructure/document/version.rs

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::infrastructure::error::FormatError;

pub const NAMESPACE_CURRENT: &str = "urn:qaspec:data-dictionary:3.0";
pub const NAMESPACE_LEGACY: &str = "urn:qaspec:data-dictionary:2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// No transformers, issue filters or value sources.
    Legacy,
    Current,
}

impl SchemaVersion {
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Legacy => NAMESPACE_LEGACY,
            Self::Current => NAMESPACE_CURRENT,
        }
    }

    pub fn from_namespace(namespace: &str) -> Result<Self, FormatError> {
        match namespace.trim() {
            NAMESPACE_CURRENT => Ok(Self::Current),
            NAMESPACE_LEGACY => Ok(Self::Legacy),
            other => Err(FormatError::UnsupportedSchema(other.to_string())),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

fn re_namespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^namespace\s*:\s*["']?([^"'\s#]+)"#)
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Reads the root `namespace` key without parsing the whole document.
/// A document without one is taken to be current.
pub fn detect_schema_version(text: &str) -> Result<SchemaVersion, FormatError> {
    match re_namespace().captures(text).and_then(|c| c.get(1)) {
        Some(namespace) => SchemaVersion::from_namespace(namespace.as_str()),
        None => Ok(SchemaVersion::Current),
    }
}
