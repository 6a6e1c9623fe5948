use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use uuid::Uuid;

use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::models::member::MemberModel;
use coop_lending_db::models::surety::SuretyModel;
use coop_lending_db::repository::member_repository::MemberRepository;
use coop_lending_db::repository::memory::InMemoryLendingStore;
use coop_lending_db::repository::unit_of_work::{LendingStore, UnitOfWork};

use super::LoanLifecycleService;
use crate::config::LendingConfig;
use crate::domain::requests::{
    ApplyForLoanRequest, LoanDecision, LoanDecisionRequest, SuretyDecision, SuretyResponseRequest,
};
use crate::error::LendingResult;
use crate::service::clock::FixedClock;

/// 2024-01-20 09:30 UTC, after the default due day
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 9, 30, 0).unwrap()
}

pub fn create_test_member(phone: &str, balance: Decimal) -> MemberModel {
    MemberModel {
        id: Uuid::new_v4(),
        display_name: HeaplessString::try_from("Test Member").unwrap(),
        phone_number: HeaplessString::try_from(phone).unwrap(),
        balance,
        created_at: test_now(),
        updated_at: test_now(),
    }
}

/// Pending loan with `sureties` unanswered sureties
pub fn create_test_loan(member_id: Uuid, sureties: usize) -> LoanModel {
    LoanModel {
        id: Uuid::new_v4(),
        member_id,
        amount: Decimal::new(100000, 0),
        interest_rate: Decimal::new(5, 0),
        duration_months: 12,
        purpose: HeaplessString::try_from("Farm equipment").unwrap(),
        payment_due_day: 15,
        status: LoanStatus::Pending,
        sureties: (0..sureties)
            .map(|_| SuretyModel::pending(Uuid::new_v4()))
            .collect(),
        start_date: None,
        end_date: None,
        monthly_payment: None,
        total_interest: None,
        total_repayment: None,
        remaining_amount: None,
        amount_paid: Decimal::ZERO,
        repayments: Vec::new(),
        next_payment_date: None,
        approved_by: None,
        approved_at: None,
        created_at: test_now(),
        updated_at: test_now(),
    }
}

pub type TestService = LoanLifecycleService<InMemoryLendingStore, Arc<FixedClock>>;

/// Service over an in-memory store with a clock frozen at [`test_now`]
pub struct TestHarness {
    pub service: TestService,
    pub store: InMemoryLendingStore,
    pub clock: Arc<FixedClock>,
    pub admin: Uuid,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(LendingConfig::default()).await
    }

    pub async fn with_config(config: LendingConfig) -> Self {
        let store = InMemoryLendingStore::new();
        let clock = Arc::new(FixedClock::new(test_now()));
        let service = LoanLifecycleService::new(store.clone(), clock.clone(), config);
        Self {
            service,
            store,
            clock,
            admin: Uuid::new_v4(),
        }
    }

    pub async fn add_member(&self, phone: &str, balance: Decimal) -> MemberModel {
        let session = self.store.begin().await.unwrap();
        let member = session
            .create_member(create_test_member(phone, balance))
            .await
            .unwrap();
        session.commit().await.unwrap();
        member
    }

    pub async fn balance(&self, member_id: Uuid) -> Decimal {
        self.store.snapshot().await.members[&member_id].balance
    }

    pub async fn set_balance(&self, member_id: Uuid, balance: Decimal) {
        let session = self.store.begin().await.unwrap();
        session.update_member_balance(member_id, balance).await.unwrap();
        session.commit().await.unwrap();
    }

    pub fn application(
        &self,
        borrower: &MemberModel,
        amount: Decimal,
        duration_months: u32,
        surety_phones: &[&str],
    ) -> ApplyForLoanRequest {
        ApplyForLoanRequest {
            member_id: borrower.id,
            amount,
            duration_months,
            purpose: "Farm equipment".to_string(),
            payment_due_day: None,
            surety_phone_numbers: surety_phones.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub async fn pending_loan(
        &self,
        borrower: &MemberModel,
        amount: Decimal,
        duration_months: u32,
        surety_phones: &[&str],
    ) -> LoanModel {
        self.service
            .apply_for_loan(self.application(borrower, amount, duration_months, surety_phones))
            .await
            .unwrap()
    }

    pub async fn respond(&self, loan_id: Uuid, member_id: Uuid, decision: SuretyDecision) {
        self.service
            .respond_to_surety(SuretyResponseRequest {
                loan_id,
                member_id,
                decision,
            })
            .await
            .unwrap();
    }

    pub async fn approve(&self, loan_id: Uuid) -> LendingResult<LoanModel> {
        self.service
            .decide_loan(LoanDecisionRequest {
                loan_id,
                decision: LoanDecision::Approved,
                decided_by: self.admin,
            })
            .await
    }

    pub async fn reject(&self, loan_id: Uuid) -> LoanModel {
        self.service
            .decide_loan(LoanDecisionRequest {
                loan_id,
                decision: LoanDecision::Rejected,
                decided_by: self.admin,
            })
            .await
            .unwrap()
    }

    /// Apply, have the single surety approve, then approve
    pub async fn active_loan(
        &self,
        borrower: &MemberModel,
        amount: Decimal,
        duration_months: u32,
        surety_phone: &str,
    ) -> LoanModel {
        let loan = self
            .pending_loan(borrower, amount, duration_months, &[surety_phone])
            .await;
        for surety in &loan.sureties {
            self.respond(loan.id, surety.member_id, SuretyDecision::Approved)
                .await;
        }
        self.approve(loan.id).await.unwrap()
    }
}
