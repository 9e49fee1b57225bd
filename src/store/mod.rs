//! Persistence seams. Handlers only see these traits; `main` decides the implementations.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{
    account::{Account, NewAccount},
    employee::{Employee, EmployeeInput},
    role::Role,
    salary_slip::{NewSlipRecord, SlipRecord},
};

pub mod artifacts;
#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, StoreError>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, StoreError>;
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError>;
    /// Returns `Ok(None)` when no employee has this id.
    async fn update_employee(
        &self,
        id: u64,
        input: EmployeeInput,
    ) -> Result<Option<Employee>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete_employee(&self, id: u64) -> Result<bool, StoreError>;
    /// Finds another employee already holding `email` or `employee_code`.
    async fn find_conflict(
        &self,
        email: &str,
        employee_code: &str,
        exclude_id: Option<u64>,
    ) -> Result<Option<Employee>, StoreError>;
}

/// Append-only catalog of generated slips.
#[async_trait]
pub trait SlipLedger: Send + Sync {
    async fn record_slip(&self, slip: NewSlipRecord) -> Result<SlipRecord, StoreError>;
    async fn list_slips(&self) -> Result<Vec<SlipRecord>, StoreError>;
    /// Removes the record and hands it back so the caller can clean up its artifact.
    async fn delete_slip(&self, id: u64) -> Result<Option<SlipRecord>, StoreError>;
    async fn delete_all_for_employee(&self, employee_id: u64) -> Result<u64, StoreError>;
    /// Whether any remaining record points at `locator`.
    async fn artifact_in_use(&self, locator: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, derive_more::Display)]
#[display(fmt = "{}", _0)]
pub struct ArtifactError(pub String);

/// Write sink for rendered documents.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persists `bytes` under `name` and returns a locator for later removal.
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, ArtifactError>;
    /// Removing a locator whose artifact is already gone is not an error.
    async fn remove(&self, locator: &str) -> Result<(), ArtifactError>;
    /// URL a client can fetch the artifact from.
    fn public_url(&self, locator: &str) -> String;
}
