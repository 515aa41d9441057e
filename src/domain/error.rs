#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("unknown borrow status: {0}")]
    UnknownStatus(String),
}
