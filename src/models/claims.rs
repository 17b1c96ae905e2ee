use serde::{Deserialize, Serialize};

const FALLBACK_NAME: &str = "Demo User";

/// Payload carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// The caller as resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub image_url: Option<String>,
    pub email: Option<String>,
    pub name: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        let email = non_blank(claims.email);
        let name = non_blank(claims.name)
            .or_else(|| email.clone())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        Self {
            user_id: claims.sub,
            image_url: non_blank(claims.picture),
            email,
            name,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
