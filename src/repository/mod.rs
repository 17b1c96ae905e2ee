//! Persistence seams for snippets and user profiles.
//!
//! Handlers only see the traits. The Postgres implementations keep the
//! denormalized `likes_count`/`views_count` columns in step with the `likes`
//! and `views` tables by changing both inside one transaction with atomic
//! `UPDATE ... SET n = n + delta` statements.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        Identity, LikeToggle, NewSnippet, ProfileUpdate, Snippet, SnippetFilter, SnippetPage, User,
    },
};

#[cfg(test)]
pub mod memory;
mod snippets;
mod users;

pub use snippets::PgSnippetRepository;
pub use users::PgUserRepository;

#[async_trait]
pub trait SnippetRepository: Send + Sync {
    async fn create(&self, snippet: NewSnippet) -> Result<Snippet, AppError>;

    async fn get_and_record_view(&self, id: Uuid, viewer: Option<&str>)
        -> Result<Snippet, AppError>;

    async fn list(&self, filter: &SnippetFilter) -> Result<SnippetPage, AppError>;

    async fn toggle_like(&self, user_id: &str, snippet_id: Uuid) -> Result<LikeToggle, AppError>;

    async fn is_liked(&self, user_id: &str, snippet_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_or_create(&self, identity: &Identity) -> Result<User, AppError>;

    async fn create_or_update(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<User, AppError>;

    async fn get_by_id(&self, id: &str) -> Result<User, AppError>;
}
