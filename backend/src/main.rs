mod config;
mod error;
mod inference;
mod pages;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use inference::{Classify, InferenceGateway};
use pages::RecipePages;
use routes::configure_routes;
use std::env;
use std::sync::Arc;
use storage::disk_service::DiskStorage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let storage = DiskStorage::new(&config.storage.upload_dir);
    if let Err(e) = tokio::fs::create_dir_all(storage.upload_dir()).await {
        log::warn!(
            "Could not create upload directory {}: {}",
            storage.upload_dir().display(),
            e
        );
    }
    let pages = RecipePages::new(&config.pages.biscuits_dir);

    let gateway = InferenceGateway::from_config(&config.inference);
    if !gateway.is_ready() {
        log::warn!(
            "Inference is not configured; uploads will fail until ROBOFLOW_API_KEY, \
             ROBOFLOW_WORKSPACE_ID and ROBOFLOW_WORKFLOW_ID are set."
        );
    }
    let classifier: Arc<dyn Classify> = Arc::new(gateway);

    let storage = web::Data::new(storage);
    let pages = web::Data::new(pages);
    let classifier = web::Data::from(classifier);

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(storage.clone())
            .app_data(pages.clone())
            .app_data(classifier.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
