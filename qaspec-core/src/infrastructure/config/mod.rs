pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use project::{ENV_DEFAULT_MODEL, ENV_TOLERANT, apply_env_overrides, load_project_config};
