use coop_lending_db::repository::error::RepositoryError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Every way a lending operation can fail.
///
/// Guard and validation failures are reported with their own variant so the
/// caller can render a specific message; storage failures arrive as
/// `Repository` and never stand in for a domain error.
#[derive(Error, Debug)]
pub enum LendingError {
    #[error("Invalid loan terms: {0}")]
    InvalidLoanTerms(String),

    #[error("A loan application needs at least one surety")]
    NoSureties,

    #[error("No member found for surety phone number(s): {}", .0.join(", "))]
    SuretyNotFound(Vec<String>),

    #[error("Member {0} already has an approved or active loan")]
    ExistingActiveLoan(Uuid),

    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    #[error("Member {member_id} is not a surety for loan {loan_id}")]
    NotASurety { loan_id: Uuid, member_id: Uuid },

    #[error("Surety {member_id} has already responded to loan {loan_id}")]
    AlreadyResponded { loan_id: Uuid, member_id: Uuid },

    #[error("Loan {0} is not pending")]
    LoanNotPending(Uuid),

    #[error("Loan {0} is not active")]
    LoanNotActive(Uuid),

    #[error("Loan {0} is not past its grace period")]
    LoanNotOverdue(Uuid),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {amount} exceeds the remaining balance {remaining}")]
    AmountExceedsRemaining { amount: Decimal, remaining: Decimal },

    #[error("Insufficient funds: balance {balance} is less than {amount}")]
    InsufficientFunds { balance: Decimal, amount: Decimal },

    #[error("Sureties have not approved loan {0}")]
    SuretyGateNotSatisfied(Uuid),

    #[error("Reference already used: {0}")]
    DuplicateReference(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(#[source] RepositoryError),
}

impl LendingError {
    /// Stable machine-readable code for the error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            LendingError::InvalidLoanTerms(_) => "INVALID_LOAN_TERMS",
            LendingError::NoSureties => "NO_SURETIES",
            LendingError::SuretyNotFound(_) => "SURETY_NOT_FOUND",
            LendingError::ExistingActiveLoan(_) => "EXISTING_ACTIVE_LOAN",
            LendingError::LoanNotFound(_) => "LOAN_NOT_FOUND",
            LendingError::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            LendingError::NotASurety { .. } => "NOT_A_SURETY",
            LendingError::AlreadyResponded { .. } => "ALREADY_RESPONDED",
            LendingError::LoanNotPending(_) => "LOAN_NOT_PENDING",
            LendingError::LoanNotActive(_) => "LOAN_NOT_ACTIVE",
            LendingError::LoanNotOverdue(_) => "LOAN_NOT_OVERDUE",
            LendingError::InvalidAmount(_) => "INVALID_AMOUNT",
            LendingError::AmountExceedsRemaining { .. } => "AMOUNT_EXCEEDS_REMAINING",
            LendingError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LendingError::SuretyGateNotSatisfied(_) => "SURETY_GATE_NOT_SATISFIED",
            LendingError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            LendingError::Validation(_) => "VALIDATION_ERROR",
            LendingError::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// True for errors caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LendingError::Repository(_))
    }
}

impl From<RepositoryError> for LendingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OpenLoanExists(member_id) => LendingError::ExistingActiveLoan(member_id),
            RepositoryError::DuplicateReference(reference) => {
                LendingError::DuplicateReference(reference)
            }
            other => LendingError::Repository(other),
        }
    }
}

pub type LendingResult<T> = Result<T, LendingError>;
