// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

mod catalog;
mod config;
mod errors;
mod handlers;
mod history;
mod models;
mod prompt;
mod services;
mod session;
mod studio;

use crate::config::Config;
use crate::services::{GeminiService, ImageProcessor};
use crate::studio::Studio;

#[derive(Clone)]
pub struct AppState {
    studio: Arc<Studio>,
    image_processor: Arc<ImageProcessor>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Lumen studio...");

    let config = Config::from_env().context("Failed to load configuration")?;
    let generator = Arc::new(GeminiService::new(&config.gemini)?);
    info!("Using image model {}", config.gemini.model);

    let app_state = AppState {
        studio: Arc::new(Studio::new(generator)),
        image_processor: Arc::new(ImageProcessor::default()),
    };

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(handlers::routes)
            .route("/health", web::get().to(health_check))
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("Failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "lumen-studio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
