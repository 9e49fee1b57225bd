use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod payroll;
mod routes;
mod state;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::routes::RateLimits;
use crate::state::AppState;
use crate::store::{artifacts::FsArtifactStore, mysql::MySqlStore};
use crate::utils::email_registry::EmailRegistry;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const EMAIL_WARMUP_BATCH: usize = 250;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config).await?;
    let store = Arc::new(MySqlStore::new(pool.clone()));

    let state = Data::new(AppState {
        accounts: store.clone(),
        employees: store.clone(),
        ledger: store,
        artifacts: Arc::new(FsArtifactStore::new(
            &config.salary_slip_dir,
            "/salary_slips",
        )),
        emails: EmailRegistry::new(),
    });

    let warmup_state = state.clone();
    let warmup_pool = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_state
            .emails
            .warmup(&warmup_pool, EMAIL_WARMUP_BATCH)
            .await
        {
            warn!(error = %e, "Failed to warm up email registry");
        }
    });

    let limits = RateLimits::from_config(&config)?;
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS assets match too
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(config_data.clone())
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, closing database pool");
    pool.close().await;
    Ok(())
}
