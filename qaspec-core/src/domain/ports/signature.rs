use crate::domain::error::DomainError;
use crate::domain::model::{InstanceDescriptor, ParameterSignature};
use std::sync::Arc;

pub trait SignatureProvider: Send + Sync {
    /// Declared parameters of the implementation behind `descriptor`.
    fn signature(
        &self,
        descriptor: &InstanceDescriptor,
    ) -> Result<Arc<ParameterSignature>, DomainError>;
}
