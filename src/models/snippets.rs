use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

// ______________________________________ Snippets ______________________________________
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub image_url: String,
    pub plug_url: Option<String>,
    pub figma_url: Option<String>,
    pub likes_count: i32,
    pub views_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A validated snippet ready to be inserted; the image is already stored.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub image_url: String,
    pub plug_url: Option<String>,
    pub figma_url: Option<String>,
}

// ______________________________________ Snippet Filters ______________________________________
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetFilter {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub user_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
    pub tags: Option<String>,
    pub user_id: Option<String>,
}

impl From<ListParams> for SnippetFilter {
    fn from(params: ListParams) -> Self {
        let tags = params
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            search: non_blank(params.search),
            tags,
            user_id: non_blank(params.user_id),
            limit: params
                .limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
            offset: params.offset.unwrap_or(0).max(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnippetPage {
    pub snippets: Vec<Snippet>,
    pub total: i64,
}

// ______________________________________ Snippet Likes ______________________________________
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}

/// Trims tags, drops empty ones and keeps the first occurrence of duplicates.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
