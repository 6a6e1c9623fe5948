//! Guarantor approval gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::models::surety::SuretyStatus;

use crate::domain::requests::SuretyDecision;
use crate::error::{LendingError, LendingResult};

/// Rule deciding when surety responses allow approval.
///
/// Under both policies a single rejection blocks the loan for good; the
/// administrator has to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuretyPolicy {
    /// Every surety approved
    AllApproved,
    /// At least one approval and no rejection
    NoRejections,
}

impl FromStr for SuretyPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_approved" => Ok(SuretyPolicy::AllApproved),
            "no_rejections" => Ok(SuretyPolicy::NoRejections),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuretyGate {
    policy: SuretyPolicy,
}

impl SuretyGate {
    pub fn new(policy: SuretyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SuretyPolicy {
        self.policy
    }

    /// Record a surety's answer on the loan.
    ///
    /// Fails with `NotASurety` when the member is not listed and with
    /// `AlreadyResponded` when the surety has left `Pending`.
    pub fn respond(
        &self,
        loan: &mut LoanModel,
        member_id: Uuid,
        decision: SuretyDecision,
        at: DateTime<Utc>,
    ) -> LendingResult<()> {
        let loan_id = loan.id;
        let surety = loan
            .surety_mut(member_id)
            .ok_or(LendingError::NotASurety { loan_id, member_id })?;
        if surety.status != SuretyStatus::Pending {
            return Err(LendingError::AlreadyResponded { loan_id, member_id });
        }
        surety.status = match decision {
            SuretyDecision::Approved => SuretyStatus::Approved,
            SuretyDecision::Rejected => SuretyStatus::Rejected,
        };
        surety.responded_at = Some(at);
        Ok(())
    }

    /// Any rejection blocks the loan permanently
    pub fn is_blocked(&self, loan: &LoanModel) -> bool {
        loan.count_sureties(SuretyStatus::Rejected) > 0
    }

    pub fn is_approvable(&self, loan: &LoanModel) -> bool {
        if loan.sureties.is_empty() || self.is_blocked(loan) {
            return false;
        }
        match self.policy {
            SuretyPolicy::AllApproved => loan
                .sureties
                .iter()
                .all(|s| s.status == SuretyStatus::Approved),
            SuretyPolicy::NoRejections => loan.count_sureties(SuretyStatus::Approved) > 0,
        }
    }
}
