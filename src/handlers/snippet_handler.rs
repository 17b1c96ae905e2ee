use actix_web::{get, post, web, HttpResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::jwt_middleware::Authenticated,
    models::{snippets::normalize_tags, LikeStatus, ListParams, NewSnippet, SnippetFilter},
    utils::{
        images::{extension_for, generate_file_name},
        links::is_figma_url,
    },
    AppState,
};

// _______________________________________ Snippet upload _______________________________________
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Base64 image bytes, optionally as a `data:` URL.
    pub image_data: String,
    pub image_type: String,
    pub plug_url: Option<String>,
    pub figma_url: Option<String>,
}

#[post("")]
pub async fn create_snippet(
    user: Authenticated,
    app_data: web::Data<AppState>,
    data_json: web::Json<CreateSnippetRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = user.0;
    let req = data_json.into_inner();

    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }

    let figma_url = non_blank(req.figma_url);
    if let Some(url) = &figma_url {
        if !is_figma_url(url) {
            return Err(AppError::validation("invalid Figma URL"));
        }
    }

    let extension = extension_for(&req.image_type)?;
    let image = decode_image(&req.image_data)?;

    // snippets.user_id references users.id
    app_data.users.get_or_create(&identity).await?;

    // Not transactional with the insert below: a failed insert leaves the
    // stored image orphaned.
    let file_name = generate_file_name(extension);
    let image_url = app_data
        .images
        .store(&file_name, &image, req.image_type.trim())
        .await?;

    let snippet = app_data
        .snippets
        .create(NewSnippet {
            user_id: identity.user_id,
            title: title.to_string(),
            description: non_blank(req.description),
            tags: normalize_tags(req.tags),
            image_url,
            plug_url: non_blank(req.plug_url),
            figma_url,
        })
        .await?;

    Ok(HttpResponse::Created().json(snippet))
}

fn decode_image(image_data: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match image_data.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image_data,
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| AppError::validation("imageData is not valid base64"))?;

    if bytes.is_empty() {
        return Err(AppError::validation("image is empty"));
    }
    Ok(bytes)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// _______________________________________ Snippet reads _______________________________________
#[get("")]
pub async fn list_snippets(
    app_data: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let filter = SnippetFilter::from(params.into_inner());
    let page = app_data.snippets.list(&filter).await?;

    Ok(HttpResponse::Ok().json(page))
}

#[get("/{snippetId}")]
pub async fn get_snippet(
    user: Option<Authenticated>,
    app_data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snippet_id = path.into_inner();
    let viewer = user.map(|u| u.0.user_id);

    let snippet = app_data
        .snippets
        .get_and_record_view(snippet_id, viewer.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(snippet))
}

// _______________________________________ Snippet likes _______________________________________
#[get("/{snippetId}/like")]
pub async fn get_like_status(
    user: Authenticated,
    app_data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snippet_id = path.into_inner();
    let liked = app_data.snippets.is_liked(&user.0.user_id, snippet_id).await?;

    Ok(HttpResponse::Ok().json(LikeStatus { liked }))
}

#[post("/{snippetId}/like")]
pub async fn toggle_like(
    user: Authenticated,
    app_data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let snippet_id = path.into_inner();
    let toggled = app_data
        .snippets
        .toggle_like(&user.0.user_id, snippet_id)
        .await?;

    Ok(HttpResponse::Ok().json(toggled))
}
