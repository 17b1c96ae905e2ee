use actix_web::web;

use crate::handlers::snippet_handler;

pub fn config(config: &mut web::ServiceConfig) {
    config.service(
        web::scope("/snippets")
            .service(snippet_handler::list_snippets)
            .service(snippet_handler::create_snippet)
            .service(snippet_handler::get_like_status)
            .service(snippet_handler::toggle_like)
            .service(snippet_handler::get_snippet),
    );
}
