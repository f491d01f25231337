// qaspec-core/src/infrastructure/dataset_types.rs

use crate::domain::model::{Dataset, ParameterDefinition, ParameterType};
use crate::domain::ports::DatasetValidator;

/// Checks the catalog type of a dataset against the types a parameter
/// declares. Empty constraint lists accept any dataset.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetTypeValidator;

impl DatasetValidator for DatasetTypeValidator {
    fn validate(&self, dataset: &Dataset, parameter: &ParameterDefinition) -> Result<(), String> {
        let constraint = match &parameter.parameter_type {
            ParameterType::Dataset(constraint) => constraint,
            ParameterType::Scalar(data_type) => {
                return Err(format!("parameter expects a {} value", data_type));
            }
        };

        if !constraint.dataset_types.is_empty()
            && !constraint.dataset_types.contains(&dataset.dataset_type)
        {
            let expected: Vec<&str> = constraint.dataset_types.iter().map(|t| t.as_str()).collect();
            return Err(format!(
                "dataset type {} is not one of [{}]",
                dataset.dataset_type,
                expected.join(", ")
            ));
        }

        if !constraint.geometry_types.is_empty() {
            match dataset.geometry_type {
                Some(geometry) if constraint.geometry_types.contains(&geometry) => {}
                Some(geometry) => {
                    return Err(format!("geometry type {} is not accepted", geometry));
                }
                None => return Err("dataset has no geometry".to_string()),
            }
        }
        Ok(())
    }
}
