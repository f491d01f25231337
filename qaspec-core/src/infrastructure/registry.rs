// qaspec-core/src/infrastructure/registry.rs

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::model::{
    DatasetConstraint, DatasetType, DescriptorKind, GeometryType, Implementation,
    InstanceDescriptor, ParameterDefinition, ParameterSignature, ScalarType,
};
use crate::domain::ports::SignatureProvider;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_text;

// --- FILE FORMAT ---

#[derive(Debug, Deserialize)]
struct SignatureFile {
    #[serde(default)]
    implementations: Vec<ImplementationEntry>,
}

#[derive(Debug, Deserialize)]
struct ImplementationEntry {
    type_name: String,
    #[serde(default)]
    constructor: u32,
    kind: DescriptorKind,
    #[serde(default)]
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ParameterTypeEntry {
    Dataset,
    Boolean,
    Integer,
    Double,
    String,
    DateTime,
}

#[derive(Debug, Deserialize)]
struct ParameterEntry {
    name: String,
    #[serde(rename = "type")]
    parameter_type: ParameterTypeEntry,
    #[serde(default)]
    constructor: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    dataset_types: Vec<DatasetType>,
    #[serde(default)]
    geometry_types: Vec<GeometryType>,
}

impl From<ParameterEntry> for ParameterDefinition {
    fn from(entry: ParameterEntry) -> Self {
        let mut definition = match entry.parameter_type {
            ParameterTypeEntry::Dataset => ParameterDefinition::dataset(
                entry.name,
                DatasetConstraint {
                    dataset_types: entry.dataset_types,
                    geometry_types: entry.geometry_types,
                },
                entry.constructor,
            ),
            ParameterTypeEntry::Boolean => {
                ParameterDefinition::scalar(entry.name, ScalarType::Boolean, entry.constructor)
            }
            ParameterTypeEntry::Integer => {
                ParameterDefinition::scalar(entry.name, ScalarType::Integer, entry.constructor)
            }
            ParameterTypeEntry::Double => {
                ParameterDefinition::scalar(entry.name, ScalarType::Double, entry.constructor)
            }
            ParameterTypeEntry::String => {
                ParameterDefinition::scalar(entry.name, ScalarType::String, entry.constructor)
            }
            ParameterTypeEntry::DateTime => {
                ParameterDefinition::scalar(entry.name, ScalarType::DateTime, entry.constructor)
            }
        };
        definition.description = entry.description;
        definition
    }
}

#[derive(Debug, Clone)]
struct RegisteredImplementation {
    kind: DescriptorKind,
    signature: Arc<ParameterSignature>,
}

/// Explicit table of known implementations: identity -> kind and parameter
/// signature. Descriptors only ever reach implementations through it.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<Implementation, RegisteredImplementation>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) one implementation.
    pub fn register(
        &mut self,
        implementation: Implementation,
        kind: DescriptorKind,
        signature: ParameterSignature,
    ) -> &mut Self {
        debug!(%implementation, %kind, "Registering implementation");
        self.entries.insert(
            implementation,
            RegisteredImplementation {
                kind,
                signature: Arc::new(signature),
            },
        );
        self
    }

    #[instrument]
    pub fn load(path: &Path) -> Result<Self, InfrastructureError> {
        let text = read_text(path)?;
        let registry = Self::from_yaml(&text)?;
        info!(implementations = registry.len(), "Capability registry loaded");
        Ok(registry)
    }

    pub fn from_yaml(text: &str) -> Result<Self, InfrastructureError> {
        let file: SignatureFile = serde_yaml::from_str(text)?;
        let mut registry = Self::new();

        for entry in file.implementations {
            let implementation = Implementation::new(entry.type_name, entry.constructor);
            if registry.entries.contains_key(&implementation) {
                return Err(InfrastructureError::ConfigError(format!(
                    "Implementation {} registered twice",
                    implementation
                )));
            }
            let signature =
                ParameterSignature::new(entry.parameters.into_iter().map(Into::into).collect());
            registry.register(implementation, entry.kind, signature);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, implementation: &Implementation) -> bool {
        self.entries.contains_key(implementation)
    }
}

impl SignatureProvider for CapabilityRegistry {
    fn signature(
        &self,
        descriptor: &InstanceDescriptor,
    ) -> Result<Arc<ParameterSignature>, DomainError> {
        match self.entries.get(&descriptor.implementation) {
            Some(entry) if entry.kind == descriptor.kind => Ok(Arc::clone(&entry.signature)),
            _ => Err(DomainError::UnknownImplementation {
                descriptor: descriptor.name.clone(),
                kind: descriptor.kind,
                implementation: descriptor.implementation.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::ParameterType;
    use anyhow::Result;

    const SIGNATURES: &str = r#"
implementations:
  - type_name: QaMinLength
    kind: test
    parameters:
      - name: featureClass
        type: dataset
        constructor: true
        dataset_types: [vector]
        geometry_types: [polyline, polygon]
      - name: limit
        type: double
        constructor: true
      - name: is3D
        type: boolean
  - type_name: TrOnlyContainedFeatures
    kind: transformer
    parameters:
      - name: featureClass
        type: dataset
        constructor: true
"#;

    #[test]
    fn test_signature_from_yaml() -> Result<()> {
        let registry = CapabilityRegistry::from_yaml(SIGNATURES)?;
        assert_eq!(registry.len(), 2);

        let descriptor = InstanceDescriptor::new(
            "QaMinLength(0)",
            DescriptorKind::Test,
            Implementation::new("QaMinLength", 0),
        );
        let signature = registry.signature(&descriptor)?;
        assert_eq!(signature.parameters().len(), 3);
        let constructor = signature.parameters().iter().filter(|p| p.constructor).count();
        assert_eq!(constructor, 2);

        match &signature.find("featureClass").unwrap().parameter_type {
            ParameterType::Dataset(constraint) => {
                assert_eq!(constraint.dataset_types, vec![DatasetType::Vector]);
                assert_eq!(constraint.geometry_types.len(), 2);
            }
            other => panic!("unexpected parameter type {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_unknown_constructor_id() -> Result<()> {
        let registry = CapabilityRegistry::from_yaml(SIGNATURES)?;
        let descriptor = InstanceDescriptor::new(
            "QaMinLength(1)",
            DescriptorKind::Test,
            Implementation::new("QaMinLength", 1),
        );
        let err = registry.signature(&descriptor).unwrap_err();
        assert!(matches!(err, DomainError::UnknownImplementation { .. }));
        Ok(())
    }

    #[test]
    fn test_kind_must_match() -> Result<()> {
        let registry = CapabilityRegistry::from_yaml(SIGNATURES)?;
        let descriptor = InstanceDescriptor::new(
            "Tr",
            DescriptorKind::IssueFilter,
            Implementation::new("TrOnlyContainedFeatures", 0),
        );
        assert!(registry.signature(&descriptor).is_err());
        Ok(())
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let text = r#"
implementations:
  - { type_name: QaX, kind: test }
  - { type_name: QaX, kind: test }
"#;
        assert!(CapabilityRegistry::from_yaml(text).is_err());
    }
}
