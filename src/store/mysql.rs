use std::str::FromStr;

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use super::{AccountStore, EmployeeDirectory, SlipLedger};
use crate::error::StoreError;
use crate::model::{
    account::{Account, NewAccount},
    employee::{Employee, EmployeeInput},
    role::Role,
    salary_slip::{NewSlipRecord, SlipRecord},
};

const EMPLOYEE_COLUMNS: &str = r#"
    id, username, email, base_salary, employee_code, join_date, pan, adhaar, designation,
    house_rent_allowance, transport_allowance, medical_allowance, bonus, ot,
    income_tax, provident_fund, esi, professional_tax, other_earnings, other_deductions, advance
"#;

const SLIP_COLUMNS: &str =
    "id, employee_id, employee_name, month, days_worked, net_salary, artifact_path";

/// MySQL-backed implementation of every record store.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Maps duplicate-key errors (SQLSTATE 23000) to a conflict carrying `message`.
fn conflict_or(e: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(e)
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: u64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|_| {
            StoreError::Database(sqlx::Error::Decode(
                format!("unknown role {:?} on account {}", row.role, row.id).into(),
            ))
        })?;
        Ok(Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[async_trait]
impl AccountStore for MySqlStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"INSERT INTO accounts (username, email, password_hash, role) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Email already exists"))?;

        Ok(Account {
            id: result.last_insert_id(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM accounts
            WHERE role = ?
            ORDER BY id
            "#,
        )
        .bind(role.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (username, email, base_salary, employee_code, join_date, pan, adhaar, designation,
             house_rent_allowance, transport_allowance, medical_allowance, bonus, ot,
             income_tax, provident_fund, esi, professional_tax, other_earnings, other_deductions, advance)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(input.base_salary)
        .bind(&input.employee_code)
        .bind(input.join_date)
        .bind(&input.pan)
        .bind(&input.adhaar)
        .bind(&input.designation)
        .bind(input.house_rent_allowance)
        .bind(input.transport_allowance)
        .bind(input.medical_allowance)
        .bind(input.bonus)
        .bind(input.ot)
        .bind(input.income_tax)
        .bind(input.provident_fund)
        .bind(input.esi)
        .bind(input.professional_tax)
        .bind(input.other_earnings)
        .bind(input.other_deductions)
        .bind(input.advance)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Employee with this email or employee ID already exists"))?;

        Ok(Employee::from_input(result.last_insert_id(), input))
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: u64,
        input: EmployeeInput,
    ) -> Result<Option<Employee>, StoreError> {
        // MySQL reports zero affected rows for a no-op update, so existence is checked first.
        if self.get_employee(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE employees SET
                username = ?, email = ?, base_salary = ?, employee_code = ?, join_date = ?,
                pan = ?, adhaar = ?, designation = ?,
                house_rent_allowance = ?, transport_allowance = ?, medical_allowance = ?,
                bonus = ?, ot = ?, income_tax = ?, provident_fund = ?, esi = ?,
                professional_tax = ?, other_earnings = ?, other_deductions = ?, advance = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(input.base_salary)
        .bind(&input.employee_code)
        .bind(input.join_date)
        .bind(&input.pan)
        .bind(&input.adhaar)
        .bind(&input.designation)
        .bind(input.house_rent_allowance)
        .bind(input.transport_allowance)
        .bind(input.medical_allowance)
        .bind(input.bonus)
        .bind(input.ot)
        .bind(input.income_tax)
        .bind(input.provident_fund)
        .bind(input.esi)
        .bind(input.professional_tax)
        .bind(input.other_earnings)
        .bind(input.other_deductions)
        .bind(input.advance)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Email or employee ID is already in use"))?;

        Ok(Some(Employee::from_input(id, input)))
    }

    async fn delete_employee(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_conflict(
        &self,
        email: &str,
        employee_code: &str,
        exclude_id: Option<u64>,
    ) -> Result<Option<Employee>, StoreError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees \
             WHERE (email = ? OR employee_code = ?) AND id <> ? LIMIT 1"
        );
        // ids start at 1, so 0 excludes nothing
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .bind(employee_code)
            .bind(exclude_id.unwrap_or(0))
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }
}

#[async_trait]
impl SlipLedger for MySqlStore {
    async fn record_slip(&self, slip: NewSlipRecord) -> Result<SlipRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO salary_slips
            (employee_id, employee_name, month, days_worked, net_salary, artifact_path)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(slip.employee_id)
        .bind(&slip.employee_name)
        .bind(&slip.month)
        .bind(slip.days_worked)
        .bind(slip.net_salary)
        .bind(&slip.artifact_path)
        .execute(&self.pool)
        .await?;

        Ok(SlipRecord {
            id: result.last_insert_id(),
            employee_id: slip.employee_id,
            employee_name: slip.employee_name,
            month: slip.month,
            days_worked: slip.days_worked,
            net_salary: slip.net_salary,
            artifact_path: slip.artifact_path,
        })
    }

    async fn list_slips(&self) -> Result<Vec<SlipRecord>, StoreError> {
        let sql = format!("SELECT {SLIP_COLUMNS} FROM salary_slips ORDER BY id DESC");
        let slips = sqlx::query_as::<_, SlipRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(slips)
    }

    async fn delete_slip(&self, id: u64) -> Result<Option<SlipRecord>, StoreError> {
        let sql = format!("SELECT {SLIP_COLUMNS} FROM salary_slips WHERE id = ?");
        let Some(slip) = sqlx::query_as::<_, SlipRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM salary_slips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(slip_id = id, "Salary slip vanished before delete");
            return Ok(None);
        }
        Ok(Some(slip))
    }

    async fn delete_all_for_employee(&self, employee_id: u64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM salary_slips WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn artifact_in_use(&self, locator: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM salary_slips WHERE artifact_path = ?",
        )
        .bind(locator)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
