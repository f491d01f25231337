use crate::domain::error::DomainError;

pub trait IssueFilterExpressionParser: Send + Sync {
    /// Issue filter names referenced by `expression`, in order of first
    /// appearance and without duplicates.
    fn referenced_filters(&self, expression: &str) -> Result<Vec<String>, DomainError>;
}
