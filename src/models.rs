use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{account::AccountView, role::Role};

#[derive(Deserialize, ToSchema)]
pub struct SignupReq {
    #[schema(example = "priya")]
    pub username: Option<String>,
    #[schema(example = "priya@company.com")]
    pub email: Option<String>,
    #[schema(example = "s3cret-pass")]
    pub password: Option<String>,
    /// `Admin` or `Accounts`.
    #[schema(example = "Accounts")]
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "priya@company.com")]
    pub email: Option<String>,
    #[schema(example = "s3cret-pass")]
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: AccountView,
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Salary slip deleted successfully")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Employee not found")]
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: u64,
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
