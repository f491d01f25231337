// qaspec-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::model::{DescriptorKind, FragmentKind};

/// Coarse classification used by callers deciding how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StructuralViolation,
    UnknownReference,
    VersionMismatch,
}

#[derive(Error, Debug, Diagnostic)]
#[allow(unused_assignments)]
pub enum DomainError {
    // --- DOCUMENT STRUCTURE ---
    #[error("Duplicate {kind} name: '{name}'")]
    #[diagnostic(
        code(qaspec::domain::duplicate_name),
        help("Names must be unique per fragment kind (comparison ignores case).")
    )]
    DuplicateName { kind: FragmentKind, name: String },

    #[error("Duplicate UUID {uuid}: used by {first} and {second}")]
    #[diagnostic(code(qaspec::domain::duplicate_uuid))]
    DuplicateUuid {
        uuid: String,
        first: String,
        second: String,
    },

    #[error("Category '{category}' is not allowed to contain {content}")]
    #[diagnostic(
        code(qaspec::domain::category_content),
        help("Check the can_contain_* flags of the category.")
    )]
    CategoryContentViolation { category: String, content: String },

    #[error("Cyclic reference detected: {0}")]
    #[diagnostic(
        code(qaspec::domain::cycle),
        help("A transformer must not (directly or indirectly) use itself as a value source.")
    )]
    CyclicReference(String),

    #[error("Invalid issue filter expression '{expression}': {message}")]
    #[diagnostic(code(qaspec::domain::expression))]
    InvalidExpression { expression: String, message: String },

    // --- PARAMETERS ---
    #[error(
        "Parameter '{parameter}' of '{configuration}' is not declared by descriptor '{descriptor}'"
    )]
    #[diagnostic(
        code(qaspec::domain::version_mismatch),
        help("The document was probably written for another version of the implementation.")
    )]
    UnknownParameter {
        configuration: String,
        parameter: String,
        descriptor: String,
    },

    #[error("Parameter '{parameter}' of '{configuration}' expects a {expected} value")]
    #[diagnostic(code(qaspec::domain::parameter_kind))]
    ParameterKindMismatch {
        configuration: String,
        parameter: String,
        expected: &'static str,
    },

    #[error("Invalid {data_type} value '{value}' for parameter '{parameter}' of '{configuration}'")]
    #[diagnostic(code(qaspec::domain::scalar_value))]
    InvalidScalarValue {
        configuration: String,
        parameter: String,
        value: String,
        data_type: String,
    },

    #[error("Dataset parameter '{parameter}' of '{configuration}' has no value")]
    #[diagnostic(
        code(qaspec::domain::missing_dataset),
        help("Constructor parameters need a dataset or a transformer.")
    )]
    MissingDatasetValue {
        configuration: String,
        parameter: String,
    },

    #[error(
        "Dataset '{dataset}' is not valid for parameter '{parameter}' of '{configuration}': {message}"
    )]
    #[diagnostic(code(qaspec::domain::invalid_dataset))]
    InvalidDataset {
        configuration: String,
        parameter: String,
        dataset: String,
        message: String,
    },

    // --- DATASET RESOLUTION ---
    #[error(
        "Dataset '{dataset}' (workspace: {}) referenced by '{configuration}' not found",
        .workspace_id.as_deref().unwrap_or("<none>")
    )]
    #[diagnostic(
        code(qaspec::domain::unknown_dataset),
        help("Import in tolerant mode to skip configurations with unknown datasets.")
    )]
    UnknownDataset {
        dataset: String,
        workspace_id: Option<String>,
        configuration: String,
    },

    #[error("Dataset name '{dataset}' referenced by '{configuration}' is ambiguous ({count} matches)")]
    #[diagnostic(
        code(qaspec::domain::ambiguous_dataset),
        help("Qualify the reference with a workspace id.")
    )]
    AmbiguousDataset {
        dataset: String,
        configuration: String,
        count: usize,
    },

    #[error("Workspace id '{workspace_id}' referenced by '{configuration}' is not defined")]
    #[diagnostic(code(qaspec::domain::unknown_workspace))]
    UnknownWorkspace {
        workspace_id: String,
        configuration: String,
    },

    #[error("Model '{model}' referenced by {referenced_by} not found in catalog")]
    #[diagnostic(code(qaspec::domain::unknown_model))]
    UnknownModel { model: String, referenced_by: String },

    // --- FRAGMENT REFERENCES ---
    #[error("Unknown {kind} '{name}' referenced by '{referenced_by}'")]
    #[diagnostic(code(qaspec::domain::unknown_reference))]
    UnknownReference {
        kind: FragmentKind,
        name: String,
        referenced_by: String,
    },

    #[error("No {kind} implementation registered for descriptor '{descriptor}' ({implementation})")]
    #[diagnostic(
        code(qaspec::domain::unknown_implementation),
        help("Register the implementation in the capability registry (signatures file).")
    )]
    UnknownImplementation {
        descriptor: String,
        kind: DescriptorKind,
        implementation: String,
    },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownParameter { .. } => ErrorKind::VersionMismatch,
            Self::UnknownDataset { .. }
            | Self::UnknownWorkspace { .. }
            | Self::UnknownModel { .. }
            | Self::UnknownReference { .. }
            | Self::UnknownImplementation { .. } => ErrorKind::UnknownReference,
            _ => ErrorKind::StructuralViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let mismatch = DomainError::UnknownParameter {
            configuration: "C1".into(),
            parameter: "tolerance".into(),
            descriptor: "QaMinLength".into(),
        };
        assert_eq!(mismatch.kind(), ErrorKind::VersionMismatch);

        let missing = DomainError::UnknownDataset {
            dataset: "Roads2".into(),
            workspace_id: Some("WS1".into()),
            configuration: "C1".into(),
        };
        assert_eq!(missing.kind(), ErrorKind::UnknownReference);

        let ambiguous = DomainError::AmbiguousDataset {
            dataset: "Roads".into(),
            configuration: "C1".into(),
            count: 2,
        };
        assert_eq!(ambiguous.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn test_unknown_dataset_message_names_workspace() {
        let err = DomainError::UnknownDataset {
            dataset: "Roads2".into(),
            workspace_id: Some("WS1".into()),
            configuration: "C1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Dataset 'Roads2' (workspace: WS1) referenced by 'C1' not found"
        );

        let err = DomainError::UnknownDataset {
            dataset: "Roads2".into(),
            workspace_id: None,
            configuration: "C1".into(),
        };
        assert!(err.to_string().contains("<none>"));
    }
}
