//! In-memory lending store.
//!
//! Sessions are serialized on a single async mutex. Each session works on a
//! copy of the committed state that replaces it on `commit`; rollback or drop
//! discards the copy. This gives the same all-or-nothing behaviour as the
//! PostgreSQL store, which makes it suitable for tests and embedding.

mod session;
mod state;

pub use session::InMemorySession;
pub use state::LendingState;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::repository::error::RepositoryResult;
use crate::repository::unit_of_work::LendingStore;

#[derive(Clone, Default)]
pub struct InMemoryLendingStore {
    state: Arc<Mutex<LendingState>>,
}

impl InMemoryLendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state, for inspection
    pub async fn snapshot(&self) -> LendingState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl LendingStore for InMemoryLendingStore {
    type Session = InMemorySession;

    async fn begin(&self) -> RepositoryResult<Self::Session> {
        let committed = self.state.clone().lock_owned().await;
        Ok(InMemorySession::new(committed))
    }
}
