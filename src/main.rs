use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

use crate::{
    config::Config,
    middleware::jwt_middleware::ResolveIdentity,
    repository::{PgSnippetRepository, PgUserRepository, SnippetRepository, UserRepository},
    storage::{FsImageStore, ImageStore},
};

mod config;
mod error;
mod handlers;
mod models;
mod repository;
mod storage;
mod utils;

mod middleware;
mod routes;

pub struct AppState {
    snippets: Arc<dyn SnippetRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
    jwt_secret: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::from_filename(".env")
        .or_else(|_| dotenv::dotenv())
        .ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(to_io)?;
    info!("Database pool ready");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(to_io)?;
    info!("Migrations applied");

    let images = Arc::new(
        FsImageStore::new(config.upload_dir.clone(), config.image_base_url.clone())
            .await
            .map_err(to_io)?,
    );
    if images.files().is_some() {
        info!("Serving uploaded images under {}", config.image_base_url);
    }

    let app_data = Data::new(AppState {
        snippets: Arc::new(PgSnippetRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool)),
        images: images.clone(),
        jwt_secret: config.jwt_secret.clone(),
    });

    let identity_middleware = ResolveIdentity::new(app_data.clone());
    let max_upload_bytes = config.max_upload_bytes;

    info!("Binding to {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(app_data.clone())
            .wrap(identity_middleware.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(|cfg| {
                routes::config(cfg, max_upload_bytes);
                if let Some(files) = images.files() {
                    cfg.service(files);
                }
            })
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn to_io<E: std::fmt::Display>(e: E) -> std::io::Error {
    error!("Startup failed: {e}");
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
