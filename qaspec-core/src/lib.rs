// qaspec-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Domain (core model)
// Descriptors, configurations, specifications, datasets, reference graph, ports.
// Depends on nothing else in the crate.
pub mod domain;

// 2. Infrastructure (Adapters)
// Exchange document codec, project config, catalog, capability registry,
// issue filter expression parser.
pub mod infrastructure;

// 3. Application (Use Cases)
// Validation, dataset resolution, reference cache, import and export.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::QaSpecError;
