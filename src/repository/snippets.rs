use async_trait::async_trait;
use log::debug;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::SnippetRepository;
use crate::{
    error::AppError,
    models::{LikeToggle, NewSnippet, Snippet, SnippetFilter, SnippetPage},
};

pub struct PgSnippetRepository {
    db: Pool<Postgres>,
}

impl PgSnippetRepository {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnippetRepository for PgSnippetRepository {
    async fn create(&self, snippet: NewSnippet) -> Result<Snippet, AppError> {
        let created = sqlx::query_as::<_, Snippet>(
            r#"
            INSERT INTO snippets (user_id, title, description, tags, image_url, plug_url, figma_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, description, tags, image_url,
                      plug_url, figma_url, likes_count, views_count, created_at
            "#,
        )
        .bind(&snippet.user_id)
        .bind(&snippet.title)
        .bind(&snippet.description)
        .bind(&snippet.tags)
        .bind(&snippet.image_url)
        .bind(&snippet.plug_url)
        .bind(&snippet.figma_url)
        .fetch_one(&self.db)
        .await?;

        debug!("Created snippet {} for {}", created.id, created.user_id);
        Ok(created)
    }

    async fn get_and_record_view(
        &self,
        id: Uuid,
        viewer: Option<&str>,
    ) -> Result<Snippet, AppError> {
        let mut tx = self.db.begin().await?;

        let snippet = sqlx::query_as::<_, Snippet>(
            r#"
            UPDATE snippets
               SET views_count = views_count + 1
             WHERE id = $1
            RETURNING id, user_id, title, description, tags, image_url,
                      plug_url, figma_url, likes_count, views_count, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("snippet not found"))?;

        sqlx::query("INSERT INTO views (user_id, snippet_id) VALUES ($1, $2)")
            .bind(viewer)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Recorded view of {id} (viewer: {viewer:?})");
        Ok(snippet)
    }

    async fn list(&self, filter: &SnippetFilter) -> Result<SnippetPage, AppError> {
        let mut count_qb = count_query(filter);
        let mut data_qb = page_query(filter);

        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(&self.db)
            .await?;

        let snippets: Vec<Snippet> = data_qb
            .build_query_as()
            .fetch_all(&self.db)
            .await?;

        Ok(SnippetPage { snippets, total })
    }

    async fn toggle_like(&self, user_id: &str, snippet_id: Uuid) -> Result<LikeToggle, AppError> {
        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent toggles on the same snippet.
        sqlx::query("SELECT id FROM snippets WHERE id = $1 FOR UPDATE")
            .bind(snippet_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("snippet not found"))?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND snippet_id = $2")
            .bind(user_id)
            .bind(snippet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let (liked, delta) = if removed > 0 {
            (false, -(removed as i32))
        } else {
            let inserted = sqlx::query(
                r#"
                INSERT INTO likes (user_id, snippet_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, snippet_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(snippet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            (true, inserted as i32)
        };

        let (likes_count,): (i32,) = sqlx::query_as(
            r#"
            UPDATE snippets
               SET likes_count = likes_count + $2
             WHERE id = $1
            RETURNING likes_count
            "#,
        )
        .bind(snippet_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("{user_id} toggled like on {snippet_id}: liked={liked}, count={likes_count}");
        Ok(LikeToggle { liked, likes_count })
    }

    async fn is_liked(&self, user_id: &str, snippet_id: Uuid) -> Result<bool, AppError> {
        let (liked,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND snippet_id = $2)",
        )
        .bind(user_id)
        .bind(snippet_id)
        .fetch_one(&self.db)
        .await?;

        Ok(liked)
    }
}

fn count_query(filter: &SnippetFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM snippets");
    push_filters(&mut qb, filter);
    qb
}

fn page_query(filter: &SnippetFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        r#"
        SELECT id, user_id, title, description, tags, image_url,
               plug_url, figma_url, likes_count, views_count, created_at
        FROM snippets
        "#,
    );
    push_filters(&mut qb, filter);

    qb.push(" ORDER BY created_at DESC, id DESC")
        .push(" LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    qb
}

/// Appends the WHERE clause; predicates and their bound values are pushed together.
fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &SnippetFilter) {
    let mut clause = " WHERE ";

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(clause)
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(" OR ")
            .push_bind(search.clone())
            .push(" = ANY(tags))");
        clause = " AND ";
    }

    if !filter.tags.is_empty() {
        qb.push(clause)
            .push("tags && ")
            .push_bind(filter.tags.clone())
            .push("::text[]");
        clause = " AND ";
    }

    if let Some(user_id) = &filter.user_id {
        qb.push(clause).push("user_id = ").push_bind(user_id.clone());
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
