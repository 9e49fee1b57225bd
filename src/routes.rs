use std::sync::Arc;

use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};

use crate::{
    api::{account, employee, files, salary_slip},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::{json_error_handler, path_error_handler},
};

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimits {
    login: Limiter,
    signup: Limiter,
    protected: Limiter,
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            signup: build_limiter(config.rate_signup_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/signup")
                    .wrap(limits.signup.clone())
                    .route(web::post().to(handlers::signup)),
            ),
    );

    // Rendered slips
    cfg.service(web::resource("/salary_slips/{file}").route(web::get().to(files::view_slip)))
        .service(web::resource("/download/{file}").route(web::get().to(files::download_slip)));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limits.protected.clone())
            .service(
                web::resource("/salary-slip").route(web::post().to(salary_slip::generate_slip)),
            )
            .service(web::resource("/salary-slips").route(web::get().to(salary_slip::list_slips)))
            .service(
                web::resource("/salary-slips/{id}")
                    .route(web::delete().to(salary_slip::delete_slip)),
            )
            .service(web::resource("/add-employees").route(web::post().to(employee::add_employee)))
            .service(
                web::resource("/edit-employees/{id}")
                    .route(web::put().to(employee::update_employee)),
            )
            .service(
                web::resource("/delete-employees/{id}")
                    .route(web::delete().to(employee::delete_employee)),
            )
            .service(web::resource("/employees").route(web::get().to(employee::list_employees)))
            .service(web::resource("/users").route(web::get().to(account::list_accounts))),
    );
}

// SIGNUP / LOGIN
//  └─ token (ACCESS_TOKEN_TTL)

// API REQUEST
//  └─ Authorization: Bearer token
//       ├─ 401 missing / invalid / expired
//       └─ 403 wrong role on Accounts-only routes
