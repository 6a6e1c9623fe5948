#[cfg(test)]
pub mod test_utils {
    use chrono::Utc;
    use coop_lending_db::models::loan::{LoanModel, LoanStatus};
    use coop_lending_db::models::member::MemberModel;
    use coop_lending_db::models::surety::SuretyModel;
    use coop_lending_db::repository::member_repository::MemberRepository;
    use heapless::String as HeaplessString;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::repository::lending::member_repository::test_utils::test_utils::{
        create_test_member, unique_phone,
    };

    pub fn create_test_loan(member_id: Uuid, sureties: &[MemberModel], status: LoanStatus) -> LoanModel {
        let now = Utc::now();
        LoanModel {
            id: Uuid::new_v4(),
            member_id,
            amount: Decimal::new(1000, 0),
            interest_rate: Decimal::new(5, 0),
            duration_months: 12,
            purpose: HeaplessString::try_from("School fees").unwrap(),
            payment_due_day: 15,
            status,
            sureties: sureties.iter().map(|m| SuretyModel::pending(m.id)).collect(),
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
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create_borrower_and_sureties<R: MemberRepository>(
        repo: &R,
        surety_count: usize,
    ) -> Result<(MemberModel, Vec<MemberModel>), Box<dyn std::error::Error + Send + Sync>> {
        let borrower = repo
            .create_member(create_test_member(&unique_phone(), Decimal::ZERO))
            .await?;
        let mut sureties = Vec::with_capacity(surety_count);
        for _ in 0..surety_count {
            sureties.push(
                repo.create_member(create_test_member(&unique_phone(), Decimal::ZERO))
                    .await?,
            );
        }
        Ok((borrower, sureties))
    }
}
