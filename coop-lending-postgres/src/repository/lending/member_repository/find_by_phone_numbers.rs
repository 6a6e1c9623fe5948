use coop_lending_db::models::member::MemberModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};
use coop_lending_db::utils::hash_as_i64;

use super::repo_impl::MemberRepositoryImpl;
use crate::utils::rows_into;

impl MemberRepositoryImpl {
    /// Looks members up through the phone number hash index, then keeps exact
    /// matches in the order the numbers were given.
    pub(super) async fn find_by_phone_numbers_impl(
        repo: &MemberRepositoryImpl,
        phone_numbers: &[String],
    ) -> RepositoryResult<Vec<MemberModel>> {
        if phone_numbers.is_empty() {
            return Ok(Vec::new());
        }

        let mut hashes = Vec::with_capacity(phone_numbers.len());
        for phone in phone_numbers {
            hashes.push(hash_as_i64(&phone.as_str())?);
        }

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query("SELECT * FROM member WHERE phone_number_hash = ANY($1)")
                .bind(hashes)
                .fetch_all(&mut **transaction)
                .await?
        };
        let candidates: Vec<MemberModel> = rows_into(&rows)?;

        Ok(phone_numbers
            .iter()
            .filter_map(|phone| {
                candidates
                    .iter()
                    .find(|m| m.phone_number.as_str() == phone.as_str())
                    .cloned()
            })
            .collect())
    }
}
