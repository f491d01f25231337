// qaspec-core/src/application/mod.rs

pub mod builder;
pub mod cache;
pub mod export;
pub mod import;
pub mod index;
pub mod report;
pub mod resolver;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use qaspec_core::application::{Importer, Exporter, ...}`.

pub use cache::{ReferenceCache, ResolutionContext};
pub use export::{ExportOptions, Exporter};
pub use import::{ImportOptions, ImportResult, Importer, SpecificationSelection};
pub use index::DocumentIndex;
pub use report::ImportReport;
pub use resolver::{
    DatasetMiss, DatasetResolver, ModelsByWorkspaceId, SkipCause, SkippedConfiguration,
};
pub use validation::validate_document;
