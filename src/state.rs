use std::sync::Arc;

use crate::store::{AccountStore, ArtifactStore, EmployeeDirectory, SlipLedger};
use crate::utils::email_registry::EmailRegistry;

/// Collaborators shared by every handler, built once in `main`.
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub employees: Arc<dyn EmployeeDirectory>,
    pub ledger: Arc<dyn SlipLedger>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub emails: EmailRegistry,
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::store::artifacts::FsArtifactStore;
    use crate::store::memory::MemoryStore;

    /// State backed by one in-memory store and a file store rooted at `dir`.
    pub fn memory_state(dir: &std::path::Path) -> (AppState, Arc<MemoryStore>) {
        memory_state_with(Arc::new(FsArtifactStore::new(dir, "/salary_slips")))
    }

    pub fn memory_state_with(artifacts: Arc<dyn ArtifactStore>) -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let state = AppState {
            accounts: store.clone(),
            employees: store.clone(),
            ledger: store.clone(),
            artifacts,
            emails: EmailRegistry::new(),
        };
        (state, store)
    }
}
