use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::info;

use crate::error::StoreError;
use crate::store::AccountStore;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Fast path for "is this email already registered".
///
/// The cuckoo filter answers "definitely not taken", the cache answers "recently seen
/// as taken", and the account store settles everything else.
pub struct EmailRegistry {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, bool>,
}

impl Default for EmailRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(500_000)
                .time_to_live(Duration::from_secs(86_400))
                .build(),
        }
    }

    #[allow(clippy::ptr_arg)]
    fn might_exist(&self, email: &String) -> bool {
        match self.filter.read() {
            Ok(filter) => filter.contains(email),
            // treat a poisoned filter as "maybe" and let the store decide
            Err(_) => true,
        }
    }

    fn insert_batch(&self, emails: &[String]) {
        if let Ok(mut filter) = self.filter.write() {
            for email in emails {
                filter.add(email);
            }
        }
    }

    /// Records a freshly registered email.
    pub async fn mark_taken(&self, email: &str) {
        let email = normalize(email);
        self.insert_batch(std::slice::from_ref(&email));
        self.taken.insert(email, true).await;
    }

    pub async fn is_available(
        &self,
        email: &str,
        accounts: &dyn AccountStore,
    ) -> Result<bool, StoreError> {
        let email = normalize(email);

        if !self.might_exist(&email) {
            return Ok(true);
        }
        if self.taken.get(&email).await.unwrap_or(false) {
            return Ok(false);
        }

        let exists = accounts.email_exists(&email).await?;
        if exists {
            self.taken.insert(email, true).await;
        }
        Ok(!exists)
    }

    /// Streams every account email into the filter in batches.
    pub async fn warmup(&self, pool: &MySqlPool, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String,)>("SELECT email FROM accounts").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
            batch.push(normalize(&email));
            total += 1;

            if batch.len() == batch_size {
                self.insert_batch(&batch);
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.insert_batch(&batch);
        }

        info!(total, "Email registry warmup complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{account::NewAccount, role::Role};
    use crate::store::memory::MemoryStore;

    #[actix_web::test]
    async fn unseen_email_is_available_without_store_hit() {
        let registry = EmailRegistry::new();
        let store = MemoryStore::default();
        // the store holds it, but the filter has never seen it
        store
            .insert_account(NewAccount {
                username: "meera".into(),
                email: "meera@company.com".into(),
                password_hash: "x".into(),
                role: Role::Accounts,
            })
            .await
            .unwrap();
        assert!(registry.is_available("meera@company.com", &store).await.unwrap());
    }

    #[actix_web::test]
    async fn marked_email_is_taken() {
        let registry = EmailRegistry::new();
        let store = MemoryStore::default();
        registry.mark_taken(" Meera@Company.com").await;
        assert!(!registry.is_available("meera@company.com", &store).await.unwrap());
    }
}
