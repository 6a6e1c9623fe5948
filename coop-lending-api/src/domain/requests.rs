//! Validated request types for the lending operations.
//!
//! Callers deserialize untrusted input into these types; `validate()` runs
//! before anything reaches the lifecycle core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use coop_lending_db::models::loan::LoanStatus;

use crate::error::LendingError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyForLoanRequest {
    pub member_id: Uuid,

    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    #[validate(range(min = 1, max = 600))]
    pub duration_months: u32,

    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub purpose: String,

    #[validate(range(min = 1, max = 31))]
    pub payment_due_day: Option<u32>,

    #[validate(length(min = 1, max = 10))]
    pub surety_phone_numbers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuretyDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SuretyResponseRequest {
    pub loan_id: Uuid,
    pub member_id: Uuid,
    pub decision: SuretyDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoanDecisionRequest {
    pub loan_id: Uuid,
    pub decision: LoanDecision,
    /// Administrator taking the decision
    pub decided_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RepaymentRequest {
    pub loan_id: Uuid,

    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    /// Caller-chosen reference making retries detectable
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkDefaultedRequest {
    pub loan_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListLoansRequest {
    pub status: Option<LoanStatus>,

    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,

    #[validate(range(min = 1, max = 100_000))]
    pub page: Option<usize>,
}

/// One lending operation, as received from the outer layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LendingCommand {
    ApplyForLoan(ApplyForLoanRequest),
    RespondToSurety(SuretyResponseRequest),
    DecideLoan(LoanDecisionRequest),
    ApplyRepayment(RepaymentRequest),
    MarkDefaulted(MarkDefaultedRequest),
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount"))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
            format!("{field}: {}", codes.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

impl ApplyForLoanRequest {
    /// Validate into the lending error kinds: an empty surety list is
    /// `NoSureties`, anything else about the terms is `InvalidLoanTerms`.
    pub fn check(&self) -> Result<(), LendingError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => {
                let fields = errors.field_errors();
                if fields.len() == 1 && self.surety_phone_numbers.is_empty() {
                    Err(LendingError::NoSureties)
                } else if fields.contains_key("surety_phone_numbers")
                    && !self.surety_phone_numbers.is_empty()
                {
                    Err(LendingError::Validation(describe(&errors)))
                } else {
                    Err(LendingError::InvalidLoanTerms(describe(&errors)))
                }
            }
        }
    }
}

impl RepaymentRequest {
    pub fn check(&self) -> Result<(), LendingError> {
        self.validate().map_err(|errors| {
            if errors.field_errors().contains_key("amount") {
                LendingError::InvalidAmount(format!("{} must be greater than zero", self.amount))
            } else {
                LendingError::Validation(describe(&errors))
            }
        })
    }
}

impl ListLoansRequest {
    pub fn check(&self) -> Result<(), LendingError> {
        self.validate()
            .map_err(|errors| LendingError::Validation(describe(&errors)))
    }
}
