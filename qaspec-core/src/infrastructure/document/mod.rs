// qaspec-core/src/infrastructure/document/mod.rs

pub mod codec;
pub mod legacy;
pub mod model;
pub mod version;

pub use codec::{discover_documents, load_document, parse_document, render_document, save_document};
pub use model::{
    AuditRecord, CategoryRecord, ConfigurationRecord, DataDictionaryDocument, DescriptorRecord,
    ElementRecord, ParameterValueRecord, SpecificationRecord, WorkspaceRecord,
};
pub use version::{NAMESPACE_CURRENT, NAMESPACE_LEGACY, SchemaVersion};
