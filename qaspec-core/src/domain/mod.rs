pub mod error;
pub mod graph;
pub mod model;
pub mod ports;
pub mod project;

// Handy re-exports to keep imports short elsewhere
pub use error::{DomainError, ErrorKind};
