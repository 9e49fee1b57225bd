//! In-process stores for handler and service tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccountStore, ArtifactError, ArtifactStore, EmployeeDirectory, SlipLedger};
use crate::error::StoreError;
use crate::model::{
    account::{Account, NewAccount},
    employee::{Employee, EmployeeInput},
    role::Role,
    salary_slip::{NewSlipRecord, SlipRecord},
};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    employees: Vec<Employee>,
    slips: Vec<SlipRecord>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn slip_count(&self) -> usize {
        self.tables.lock().unwrap().slips.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("Email already exists".into()));
        }
        let account = Account {
            id: tables.next_id(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let employee = Employee::from_input(tables.next_id(), input);
        tables.employees.push(employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.tables.lock().unwrap().employees.clone())
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn update_employee(
        &self,
        id: u64,
        input: EmployeeInput,
    ) -> Result<Option<Employee>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(slot) = tables.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        *slot = Employee::from_input(id, input);
        Ok(Some(slot.clone()))
    }

    async fn delete_employee(&self, id: u64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.employees.len();
        tables.employees.retain(|e| e.id != id);
        Ok(tables.employees.len() < before)
    }

    async fn find_conflict(
        &self,
        email: &str,
        employee_code: &str,
        exclude_id: Option<u64>,
    ) -> Result<Option<Employee>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .employees
            .iter()
            .filter(|e| Some(e.id) != exclude_id)
            .find(|e| e.email == email || e.employee_code == employee_code)
            .cloned())
    }
}

#[async_trait]
impl SlipLedger for MemoryStore {
    async fn record_slip(&self, slip: NewSlipRecord) -> Result<SlipRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let record = SlipRecord {
            id: tables.next_id(),
            employee_id: slip.employee_id,
            employee_name: slip.employee_name,
            month: slip.month,
            days_worked: slip.days_worked,
            net_salary: slip.net_salary,
            artifact_path: slip.artifact_path,
        };
        tables.slips.push(record.clone());
        Ok(record)
    }

    async fn list_slips(&self) -> Result<Vec<SlipRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.slips.iter().rev().cloned().collect())
    }

    async fn delete_slip(&self, id: u64) -> Result<Option<SlipRecord>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables.slips.iter().position(|s| s.id == id);
        Ok(position.map(|i| tables.slips.remove(i)))
    }

    async fn delete_all_for_employee(&self, employee_id: u64) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.slips.len();
        tables.slips.retain(|s| s.employee_id != employee_id);
        Ok((before - tables.slips.len()) as u64)
    }

    async fn artifact_in_use(&self, locator: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.slips.iter().any(|s| s.artifact_path == locator))
    }
}

/// Artifact sink that refuses every write.
pub struct BrokenArtifactStore;

#[async_trait]
impl ArtifactStore for BrokenArtifactStore {
    async fn store(&self, _name: &str, _bytes: Vec<u8>) -> Result<String, ArtifactError> {
        Err(ArtifactError("disk full".into()))
    }

    async fn remove(&self, _locator: &str) -> Result<(), ArtifactError> {
        Err(ArtifactError("read-only filesystem".into()))
    }

    fn public_url(&self, locator: &str) -> String {
        format!("/salary_slips/{locator}")
    }
}
