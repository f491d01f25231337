// qaspec/src/commands/mod.rs

pub mod export;
pub mod import;
pub mod inspect;
pub mod project;
pub mod validate;
