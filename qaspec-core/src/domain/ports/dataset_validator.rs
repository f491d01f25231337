use crate::domain::model::{Dataset, ParameterDefinition};

pub trait DatasetValidator: Send + Sync {
    /// `Err(message)` when `dataset` cannot be assigned to `parameter`.
    fn validate(&self, dataset: &Dataset, parameter: &ParameterDefinition) -> Result<(), String>;
}
