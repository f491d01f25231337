// src/domain/ports/mod.rs

pub mod catalog;
pub mod dataset_validator;
pub mod expression;
pub mod signature;

pub use catalog::DatasetCatalog;
pub use dataset_validator::DatasetValidator;
pub use expression::IssueFilterExpressionParser;
pub use signature::SignatureProvider;
