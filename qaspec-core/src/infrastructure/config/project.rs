// qaspec-core/src/infrastructure/config/project.rs

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_text;

pub const ENV_TOLERANT: &str = "QASPEC_TOLERANT";
pub const ENV_DEFAULT_MODEL: &str = "QASPEC_DEFAULT_MODEL";

const CANDIDATES: [&str; 2] = ["qaspec.yaml", "qaspec_project.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Discovery of the main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Base YAML
    let content = read_text(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Environment layering: QASPEC_TOLERANT=true qaspec import ...
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CANDIDATES
    )))
}

/// Overrides import settings from the environment. `lookup` is
/// `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_TOLERANT) {
        match val.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => config.import.tolerant = true,
            "0" | "false" | "no" => config.import.tolerant = false,
            other => warn!(value = other, "Ignoring invalid {}", ENV_TOLERANT),
        }
        info!(tolerant = config.import.tolerant, "Overriding tolerant mode via ENV");
    }
    if let Some(val) = lookup(ENV_DEFAULT_MODEL) {
        info!(old = ?config.import.default_model, new = ?val, "Overriding default model via ENV");
        config.import.default_model = Some(val).filter(|v| !v.trim().is_empty());
    }
}
