use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{SnippetRepository, UserRepository};
use crate::{
    error::AppError,
    models::{
        Identity, LikeToggle, NewSnippet, ProfileUpdate, Snippet, SnippetFilter, SnippetPage, User,
    },
};

/// Mirrors the Postgres schema closely enough to exercise handlers.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    // (insertion sequence, row); the sequence breaks created_at ties like `id DESC` would.
    snippets: Vec<(u64, Snippet)>,
    likes: HashSet<(String, Uuid)>,
    views: Vec<(Option<String>, Uuid, DateTime<Utc>)>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn like_rows(&self, snippet_id: Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state.likes.iter().filter(|(_, id)| *id == snippet_id).count()
    }

    pub fn view_rows(&self, snippet_id: Uuid) -> Vec<Option<String>> {
        let state = self.state.lock().unwrap();
        state
            .views
            .iter()
            .filter(|(_, id, _)| *id == snippet_id)
            .map(|(user, _, _)| user.clone())
            .collect()
    }

    pub fn snippet(&self, id: Uuid) -> Option<Snippet> {
        let state = self.state.lock().unwrap();
        state.find(id).cloned()
    }

    /// Rewrites `created_at` so tests can pin an ordering.
    pub fn backdate(&self, id: Uuid, created_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        if let Some(snippet) = state.find_mut(id) {
            snippet.created_at = created_at;
        }
    }
}

impl State {
    fn find(&self, id: Uuid) -> Option<&Snippet> {
        self.snippets.iter().map(|(_, s)| s).find(|s| s.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Snippet> {
        self.snippets
            .iter_mut()
            .map(|(_, s)| s)
            .find(|s| s.id == id)
    }
}

fn filter_matches(snippet: &Snippet, filter: &SnippetFilter) -> bool {
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let in_title = snippet.title.to_lowercase().contains(&needle);
        let in_description = snippet
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        let in_tags = snippet.tags.iter().any(|t| t == search);
        if !(in_title || in_description || in_tags) {
            return false;
        }
    }

    if !filter.tags.is_empty() && !snippet.tags.iter().any(|t| filter.tags.contains(t)) {
        return false;
    }

    if let Some(user_id) = &filter.user_id {
        if &snippet.user_id != user_id {
            return false;
        }
    }

    true
}

#[async_trait]
impl SnippetRepository for MemoryStore {
    async fn create(&self, snippet: NewSnippet) -> Result<Snippet, AppError> {
        let mut state = self.state.lock().unwrap();
        let created = Snippet {
            id: Uuid::new_v4(),
            user_id: snippet.user_id,
            title: snippet.title,
            description: snippet.description,
            tags: snippet.tags,
            image_url: snippet.image_url,
            plug_url: snippet.plug_url,
            figma_url: snippet.figma_url,
            likes_count: 0,
            views_count: 0,
            created_at: Utc::now(),
        };
        state.next_seq += 1;
        let seq = state.next_seq;
        state.snippets.push((seq, created.clone()));
        Ok(created)
    }

    async fn get_and_record_view(
        &self,
        id: Uuid,
        viewer: Option<&str>,
    ) -> Result<Snippet, AppError> {
        let mut state = self.state.lock().unwrap();
        let snippet = state
            .find_mut(id)
            .ok_or_else(|| AppError::not_found("snippet not found"))?;
        snippet.views_count += 1;
        let snippet = snippet.clone();

        state
            .views
            .push((viewer.map(str::to_owned), id, Utc::now()));
        Ok(snippet)
    }

    async fn list(&self, filter: &SnippetFilter) -> Result<SnippetPage, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<&(u64, Snippet)> = state
            .snippets
            .iter()
            .filter(|(_, s)| filter_matches(s, filter))
            .collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        let total = rows.len() as i64;
        let snippets = rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .map(|(_, s)| s.clone())
            .collect();

        Ok(SnippetPage { snippets, total })
    }

    async fn toggle_like(&self, user_id: &str, snippet_id: Uuid) -> Result<LikeToggle, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.find(snippet_id).is_none() {
            return Err(AppError::not_found("snippet not found"));
        }

        let key = (user_id.to_string(), snippet_id);
        let (liked, delta) = if state.likes.remove(&key) {
            (false, -1)
        } else {
            state.likes.insert(key);
            (true, 1)
        };

        let snippet = state
            .find_mut(snippet_id)
            .ok_or_else(|| AppError::not_found("snippet not found"))?;
        snippet.likes_count += delta;

        Ok(LikeToggle {
            liked,
            likes_count: snippet.likes_count,
        })
    }

    async fn is_liked(&self, user_id: &str, snippet_id: Uuid) -> Result<bool, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.likes.contains(&(user_id.to_string(), snippet_id)))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_or_create(&self, identity: &Identity) -> Result<User, AppError> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .entry(identity.user_id.clone())
            .or_insert_with(|| User {
                id: identity.user_id.clone(),
                name: identity.name.clone(),
                email: identity.email.clone(),
                avatar_url: identity.image_url.clone(),
                plug_url: None,
                created_at: Utc::now(),
            });
        Ok(user.clone())
    }

    async fn create_or_update(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let mut state = self.state.lock().unwrap();
        let user = match state.users.get_mut(&identity.user_id) {
            Some(existing) => {
                if let Some(name) = update.name() {
                    existing.name = name.to_string();
                }
                existing.plug_url = update.plug_url.clone();
                existing.avatar_url = identity.image_url.clone();
                existing.clone()
            }
            None => {
                let user = User {
                    id: identity.user_id.clone(),
                    name: update
                        .name()
                        .map(str::to_owned)
                        .unwrap_or_else(|| identity.name.clone()),
                    email: identity.email.clone(),
                    avatar_url: identity.image_url.clone(),
                    plug_url: update.plug_url.clone(),
                    created_at: Utc::now(),
                };
                state.users.insert(user.id.clone(), user.clone());
                user
            }
        };
        Ok(user)
    }

    async fn get_by_id(&self, id: &str) -> Result<User, AppError> {
        let state = self.state.lock().unwrap();
        state
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))
    }
}
