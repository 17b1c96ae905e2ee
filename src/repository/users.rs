use async_trait::async_trait;
use log::debug;
use sqlx::{Pool, Postgres};

use super::UserRepository;
use crate::{
    error::AppError,
    models::{Identity, ProfileUpdate, User},
};

pub struct PgUserRepository {
    db: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }

    async fn find(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, avatar_url, plug_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_or_create(&self, identity: &Identity) -> Result<User, AppError> {
        if let Some(user) = self.find(&identity.user_id).await? {
            return Ok(user);
        }

        // A concurrent first access may insert the row between the lookup
        // and here; DO NOTHING leaves that row untouched.
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&identity.user_id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.image_url)
        .execute(&self.db)
        .await?
        .rows_affected();

        if inserted > 0 {
            debug!("Created profile for {}", identity.user_id);
        }

        self.find(&identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn create_or_update(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, avatar_url, plug_url)
            VALUES ($1, COALESCE($2, $3), $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
               SET name       = COALESCE($2, users.name),
                   plug_url   = EXCLUDED.plug_url,
                   avatar_url = EXCLUDED.avatar_url
            RETURNING id, name, email, avatar_url, plug_url, created_at
            "#,
        )
        .bind(&identity.user_id)
        .bind(update.name())
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.image_url)
        .bind(&update.plug_url)
        .fetch_one(&self.db)
        .await?;

        debug!("Saved profile for {}", user.id);
        Ok(user)
    }

    async fn get_by_id(&self, id: &str) -> Result<User, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }
}
