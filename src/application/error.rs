use crate::domain::error::DomainError;
use crate::domain::model::id::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("no add/edit form is open")]
    NoActiveForm,

    #[error("no delete confirmation is open")]
    NoPendingDelete,
}
