use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_signup_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    /// Directory rendered salary slips are written to.
    pub salary_slip_dir: String,
    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: or_default("ACCESS_TOKEN_TTL", 3600)?, // 1 hour
            db_max_connections: or_default("DB_MAX_CONNECTIONS", 10)?,

            rate_login_per_min: or_default("RATE_LOGIN_PER_MIN", 60)?,
            rate_signup_per_min: or_default("RATE_SIGNUP_PER_MIN", 30)?,
            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: or_default("API_PREFIX", "/api".to_string())?,
            salary_slip_dir: or_default("SALARY_SLIP_DIR", "salary_slips".to_string())?,
            log_dir: or_default("LOG_DIR", "logs".to_string())?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 3600,
            db_max_connections: 1,
            rate_login_per_min: 60,
            rate_signup_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            salary_slip_dir: "salary_slips".into(),
            log_dir: "logs".into(),
        }
    }
}
