use actix_web::web;

use crate::error::AppError;

pub mod snippet_routes;
pub mod user_routes;

/// Registers every route, plus extractor configs that turn malformed bodies
/// and query strings into 400s with the usual error payload.
pub fn config(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(max_upload_bytes)
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .configure(snippet_routes::config)
    .configure(user_routes::config);
}
