use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use uuid::Uuid;

use coop_lending_db::models::member::MemberModel;
use coop_lending_db::repository::error::RepositoryResult;
use coop_lending_db::repository::member_repository::MemberRepository;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};

pub struct MemberRepositoryImpl {
    pub executor: Executor,
}

impl MemberRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for MemberModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(MemberModel {
            id: row.try_get("id")?,
            display_name: get_heapless_string(row, "display_name")?,
            phone_number: get_heapless_string(row, "phone_number")?,
            balance: row.try_get("balance")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl MemberRepository for MemberRepositoryImpl {
    async fn create_member(&self, member: MemberModel) -> RepositoryResult<MemberModel> {
        Self::create_impl(self, member).await
    }

    async fn find_member_by_id(&self, id: Uuid) -> RepositoryResult<Option<MemberModel>> {
        Self::find_by_id_impl(self, id).await
    }

    async fn find_members_by_phone_numbers(
        &self,
        phone_numbers: &[String],
    ) -> RepositoryResult<Vec<MemberModel>> {
        Self::find_by_phone_numbers_impl(self, phone_numbers).await
    }

    async fn update_member_balance(&self, id: Uuid, balance: Decimal) -> RepositoryResult<()> {
        Self::update_balance_impl(self, id, balance).await
    }
}
