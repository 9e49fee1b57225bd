use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Builds the full route table over in-memory stores for handler tests.
#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        test_app!($state, $crate::config::Config::for_tests())
    };
    ($state:expr, $config:expr) => {{
        let config: $crate::config::Config = $config;
        let limits = $crate::routes::RateLimits::from_config(&config).unwrap();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| $crate::routes::configure(cfg, &config, &limits)),
        )
        .await
    }};
}

pub mod account;
pub mod employee;
pub mod files;
pub mod salary_slip;

/// Decodes a JSON body after the caller's role has been checked, so that a wrong
/// role is reported before anything about the payload.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}
