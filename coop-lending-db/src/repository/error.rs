use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a repository implementation.
///
/// Constraint violations the lending core must react to get their own
/// variants; everything else is carried as a boxed backend error.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Member {0} already has an approved or active loan")]
    OpenLoanExists(Uuid),

    #[error("Ledger reference already exists: {0}")]
    DuplicateReference(String),

    #[error("Transaction has been consumed")]
    TransactionConsumed,

    #[error("Backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Backend(Box::new(err))
    }
}

impl From<String> for RepositoryError {
    fn from(message: String) -> Self {
        RepositoryError::Backend(message.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
