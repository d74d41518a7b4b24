use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("conversation not found")]
    NotFound,

    #[error("invalid message: {0}")]
    Validation(&'static str),

    #[error("wallet is empty")]
    InsufficientFunds,

    #[error("conversation was modified concurrently, retry the send")]
    Conflict,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}
