use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::error::AppError;

const ACCEPTED_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/svg+xml",
];

/// File extension for an accepted image mime type (`image/svg+xml` -> `svg`).
pub fn extension_for(mime_type: &str) -> Result<&str, AppError> {
    let mime_type = mime_type.trim();
    if !ACCEPTED_TYPES.contains(&mime_type) {
        return Err(AppError::validation(format!(
            "unsupported image type: {mime_type}"
        )));
    }

    let subtype = mime_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(mime_type);

    Ok(subtype.split('+').next().unwrap_or(subtype))
}

/// `<unix-millis>-<6 random lowercase alphanumerics>.<ext>`
pub fn generate_file_name(extension: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
}
