// qaspec-core/src/domain/graph/mod.rs

pub mod closure;
pub mod dag;

pub use closure::ReferenceClosure;
pub use dag::GraphSolver;
