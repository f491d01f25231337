// qaspec-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Raised by the document codec before any reference is resolved.
#[derive(Error, Debug, Diagnostic)]
pub enum FormatError {
    #[error("Unsupported document schema '{0}'")]
    #[diagnostic(
        code(qaspec::infra::format::schema),
        help("Supported namespaces: urn:qaspec:data-dictionary:3.0 and urn:qaspec:data-dictionary:2.0")
    )]
    UnsupportedSchema(String),

    #[error("Malformed document: {0}")]
    #[diagnostic(
        code(qaspec::infra::format::malformed),
        help("Check the record fields against the document schema.")
    )]
    Malformed(#[source] serde_yaml::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DOCUMENT FORMAT ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(qaspec::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("File not found: '{0}'")]
    #[diagnostic(code(qaspec::infra::file_missing))]
    FileNotFound(String),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(qaspec::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(qaspec::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(qaspec::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(qaspec::infra::config_invalid),
        help("Fix the reported fields in qaspec.yaml.")
    )]
    Validation(#[from] validator::ValidationErrors),
}
