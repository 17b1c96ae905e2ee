use actix_web::web;

use crate::handlers::user_handler;

pub fn config(config: &mut web::ServiceConfig) {
    // `/me` must be registered before `/{userId}`.
    config.service(
        web::scope("/users")
            .service(user_handler::get_me)
            .service(user_handler::create_or_update_me)
            .service(user_handler::get_user),
    );
}
