//! Shared transaction handle.
//!
//! Every repository of a session holds a clone of the same [`Executor`], so
//! all their statements run in one database transaction. The transaction is
//! taken out of the executor on commit or rollback; statements issued after
//! that fail with `RepositoryError::TransactionConsumed`. Dropping the last
//! clone with the transaction still inside rolls it back.

use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn commit(&self) -> RepositoryResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(RepositoryError::TransactionConsumed)?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> RepositoryResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(RepositoryError::TransactionConsumed)?;
        tx.rollback().await?;
        Ok(())
    }
}
