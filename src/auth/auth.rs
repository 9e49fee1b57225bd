use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    dev::Payload,
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: u64,
    pub username: String,
    pub role: Role,
}

/// Reads and verifies the `Authorization: Bearer <jwt>` header.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<AuthUser, AppError> {
    let header_value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".into()))?;

    let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must start with Bearer".into())
    })?;

    let claims = verify_token(token.trim(), &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    Ok(AuthUser {
        account_id: claims.account_id,
        username: claims.sub,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        let verified = req.extensions().get::<AuthUser>().cloned();
        if let Some(user) = verified {
            return ready(Ok(user));
        }

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(AppError::Internal("Config missing".into())));
        };
        ready(authenticate(req.headers(), config))
    }
}

impl AuthUser {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Access denied: {role} role required"
            )))
        }
    }

    pub fn require_accounts(&self) -> Result<(), AppError> {
        self.require(Role::Accounts)
    }
}
