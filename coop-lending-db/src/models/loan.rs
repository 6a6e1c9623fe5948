use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::repayment::RepaymentModel;
use crate::models::surety::{SuretyModel, SuretyStatus};

/// A member's loan application and, once activated, the running loan.
///
/// Sureties and repayment history are embedded: the core never queries them
/// independently of the owning loan.
///
/// Activation fields (`start_date` through `remaining_amount`) are `None`
/// until the loan leaves `Pending`. After activation
/// `remaining_amount == total_repayment - amount_paid` holds at every commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanModel {
    pub id: Uuid,
    pub member_id: Uuid,

    /// Principal requested by the member
    pub amount: Decimal,
    /// Annual interest rate in percent
    pub interest_rate: Decimal,
    pub duration_months: i32,
    pub purpose: HeaplessString<255>,
    /// Day of month the installment falls due (1-31)
    pub payment_due_day: i32,
    pub status: LoanStatus,
    pub sureties: Vec<SuretyModel>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub monthly_payment: Option<Decimal>,
    pub total_interest: Option<Decimal>,
    pub total_repayment: Option<Decimal>,
    pub remaining_amount: Option<Decimal>,
    pub amount_paid: Decimal,

    pub repayments: Vec<RepaymentModel>,
    pub next_payment_date: Option<NaiveDate>,

    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanModel {
    /// Returns the surety entry for the given member, if listed.
    pub fn surety(&self, member_id: Uuid) -> Option<&SuretyModel> {
        self.sureties.iter().find(|s| s.member_id == member_id)
    }

    pub fn surety_mut(&mut self, member_id: Uuid) -> Option<&mut SuretyModel> {
        self.sureties.iter_mut().find(|s| s.member_id == member_id)
    }

    /// True while `member_id` is listed as a surety that has not yet answered.
    pub fn awaits_surety(&self, member_id: Uuid) -> bool {
        self.status == LoanStatus::Pending
            && self
                .surety(member_id)
                .is_some_and(|s| s.status == SuretyStatus::Pending)
    }

    pub fn count_sureties(&self, status: SuretyStatus) -> usize {
        self.sureties.iter().filter(|s| s.status == status).count()
    }
}

/// Loan lifecycle status.
///
/// ```text
/// pending --approve--> active --repay to zero--> completed
///    |                   |
///    +--reject--> rejected  +--mark defaulted--> defaulted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "loan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Active,
    Completed,
    Rejected,
    Defaulted,
}

impl LoanStatus {
    /// Statuses counted against the one-open-loan-per-member rule.
    pub const OPEN: [LoanStatus; 2] = [LoanStatus::Approved, LoanStatus::Active];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Pending => write!(f, "pending"),
            LoanStatus::Approved => write!(f, "approved"),
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Completed => write!(f, "completed"),
            LoanStatus::Rejected => write!(f, "rejected"),
            LoanStatus::Defaulted => write!(f, "defaulted"),
        }
    }
}

impl FromStr for LoanStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "active" => Ok(LoanStatus::Active),
            "completed" => Ok(LoanStatus::Completed),
            "rejected" => Ok(LoanStatus::Rejected),
            "defaulted" => Ok(LoanStatus::Defaulted),
            _ => Err(()),
        }
    }
}
