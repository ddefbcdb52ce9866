use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

mod analytics;
mod api;
mod auth;
mod billing;
mod clients;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod payroll;
mod routes;
mod utils;

use analytics::{poller, service::AnalyticsService};
use clients::{inference::InferenceClient, messaging::MessagingClient};
use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "studio.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let inference = InferenceClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("inference client: {e}"))?;
    let messaging = MessagingClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("messaging client: {e}"))?;

    let refresh_every = Duration::from_secs(config.analysis_refresh_secs.max(1));
    let analytics = AnalyticsService::new(
        pool.clone(),
        inference,
        config.external_models.clone(),
        refresh_every,
    );

    if config.analytics_enabled() {
        actix_web::rt::spawn(poller::run(analytics.clone(), refresh_every));
    } else {
        warn!("INFERENCE_URL not set, background analysis disabled");
    }

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(messaging.clone()))
            .app_data(Data::new(analytics.clone()))
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
