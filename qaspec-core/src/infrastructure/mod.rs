// qaspec-core/src/infrastructure/mod.rs

pub mod catalog;
pub mod config;
pub mod dataset_types;
pub mod document;
pub mod error;
pub mod expression;
pub mod fs;
pub mod registry;

pub use catalog::YamlCatalog;
pub use dataset_types::DatasetTypeValidator;
pub use expression::BooleanExpressionParser;
pub use registry::CapabilityRegistry;
