use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

/// Credential store entry. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public projection of an account, safe to return to callers.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountView {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "priya")]
    pub username: String,
    #[schema(example = "priya@company.com")]
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}
