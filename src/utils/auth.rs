use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    error::AppError,
    models::{Claims, Identity},
};

pub const SESSION_COOKIE: &str = "session";

/// Bearer header first, then the `session` cookie.
pub fn credential(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Verifies an HS256 token and turns its claims into an [`Identity`].
/// `exp` is checked when present but not required.
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::unauthenticated("invalid token"))?;

    if data.claims.sub.trim().is_empty() {
        return Err(AppError::unauthenticated("invalid token"));
    }

    Ok(data.claims.into())
}

#[cfg(test)]
pub fn issue_token(claims: &Claims, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding")
}
