use actix_web::{get, post, web, HttpResponse};

use crate::{
    error::AppError, middleware::jwt_middleware::Authenticated, models::ProfileUpdate, AppState,
};

#[get("/me")]
pub async fn get_me(
    user: Authenticated,
    app_data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let me = app_data.users.get_or_create(&user.0).await?;

    Ok(HttpResponse::Ok().json(me))
}

/// Upserts the caller's profile. `plugUrl` is always overwritten, so leaving
/// it out clears it; `name` keeps its current value when left out.
#[post("/me")]
pub async fn create_or_update_me(
    user: Authenticated,
    app_data: web::Data<AppState>,
    data_json: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let me = app_data
        .users
        .create_or_update(&user.0, &data_json.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(me))
}

#[get("/{userId}")]
pub async fn get_user(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = app_data.users.get_by_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(user))
}
