use async_trait::async_trait;
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::RwLock;
use tracing::{debug, info};

use app_error::{AppError, AppResult};
use app_models::UserRecord;

/// Storage for user records, keyed by username.
///
/// Records are immutable once created; there is no update or delete.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record. Fails with a resource-exists error if the
    /// username is already taken; the check and the insert are atomic.
    async fn create_record(&self, record: UserRecord) -> AppResult<UserRecord>;

    /// Look a record up by username.
    async fn get_record(&self, username: &str) -> Option<UserRecord>;

    /// Number of stored records.
    async fn count(&self) -> usize;
}

/// Process-lifetime store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_record(&self, record: UserRecord) -> AppResult<UserRecord> {
        let mut records = self.records.write().await;

        match records.entry(record.username.clone()) {
            Entry::Occupied(_) => {
                debug!("Rejecting duplicate username: {}", record.username);
                Err(AppError::username_exists())
            }
            Entry::Vacant(slot) => {
                info!("Storing new user: {}", record.username);
                Ok(slot.insert(record).clone())
            }
        }
    }

    async fn get_record(&self, username: &str) -> Option<UserRecord> {
        self.records.read().await.get(username).cloned()
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}
