use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A balance-affecting event on a member account.
///
/// Entries are append-only. The ledger store assigns a reference when none is
/// given and refuses a second entry with an existing reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntryModel {
    pub id: Uuid,
    pub member_id: Uuid,
    pub loan_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: HeaplessString<255>,
    pub reference: Option<HeaplessString<64>>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    LoanDisbursement,
    LoanRepayment,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
            TransactionType::LoanDisbursement => write!(f, "loan_disbursement"),
            TransactionType::LoanRepayment => write!(f, "loan_repayment"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "loan_disbursement" => Ok(TransactionType::LoanDisbursement),
            "loan_repayment" => Ok(TransactionType::LoanRepayment),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}
