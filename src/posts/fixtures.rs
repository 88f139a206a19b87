//! In-memory demo store of numbered text posts. Fixture data only; kept
//! deliberately separate from the durable media `Post` entity and never
//! touches the database.

use std::collections::BTreeMap;
use std::sync::RwLock;

use axum::extract::{Path, Query};
use axum::Json;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPost {
    pub title: String,
    pub content: String,
}

fn seed() -> BTreeMap<u32, TextPost> {
    let entries = [
        ("New Post", "New post content goes here."),
        ("FastAPI Basics", "A quick start with FastAPI routes."),
        ("Python Tips", "Small habits that improve readability."),
        ("Async Notes", "When to use async in web APIs."),
        ("Testing", "Why tests save time long-term."),
    ];
    entries
        .iter()
        .enumerate()
        .map(|(i, (title, content))| {
            (
                (i + 1) as u32,
                TextPost {
                    title: (*title).to_string(),
                    content: (*content).to_string(),
                },
            )
        })
        .collect()
}

lazy_static! {
    static ref TEXT_POSTS: RwLock<BTreeMap<u32, TextPost>> = RwLock::new(seed());
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// GET /posts — the fixture posts in id order, optionally truncated.
/// A limit of 0 means no limit, not an empty listing.
pub async fn list_text_posts(Query(params): Query<ListParams>) -> Json<Vec<TextPost>> {
    let store = TEXT_POSTS.read().expect("text post store poisoned");
    let posts: Vec<TextPost> = match params.limit {
        Some(limit) if limit > 0 => store.values().take(limit).cloned().collect(),
        _ => store.values().cloned().collect(),
    };
    Json(posts)
}

/// GET /posts/:id — numeric fixture ids only; uuid-shaped ids belong to
/// the media posts and only make sense for DELETE on this path.
pub async fn get_text_post(Path(id): Path<String>) -> Result<Json<TextPost>, AppError> {
    let id: u32 = id
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid post id: {}", id)))?;
    let store = TEXT_POSTS.read().expect("text post store poisoned");
    store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound("Post not found"))
}

/// GET /hello-world — demo endpoint.
pub async fn hello_world() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "hello world" }))
}

/// POST /posts — append a fixture post at max id + 1.
pub async fn create_text_post(Json(post): Json<TextPost>) -> Json<TextPost> {
    let mut store = TEXT_POSTS.write().expect("text post store poisoned");
    let next_id = store.keys().next_back().copied().unwrap_or(0) + 1;
    store.insert(next_id, post.clone());
    Json(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_posts_are_listed_in_id_order() {
        let Json(posts) = list_text_posts(Query(ListParams { limit: None })).await;
        assert!(posts.len() >= 5);
        assert_eq!(posts[0].title, "New Post");
        assert_eq!(posts[1].title, "FastAPI Basics");
    }

    #[tokio::test]
    async fn limit_truncates_the_listing() {
        let Json(posts) = list_text_posts(Query(ListParams { limit: Some(2) })).await;
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn zero_limit_means_no_limit() {
        let Json(all) = list_text_posts(Query(ListParams { limit: None })).await;
        let Json(posts) = list_text_posts(Query(ListParams { limit: Some(0) })).await;
        assert_eq!(posts.len(), all.len());
        assert!(!posts.is_empty());
    }

    #[tokio::test]
    async fn hello_world_says_hello() {
        let Json(body) = hello_world().await;
        assert_eq!(body["message"], "hello world");
    }

    #[tokio::test]
    async fn get_by_id_and_missing_id() {
        let Json(post) = get_text_post(Path("1".into())).await.expect("post 1 exists");
        assert_eq!(post.title, "New Post");

        let err = get_text_post(Path("9999".into())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = get_text_post(Path("not-a-number".into())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_appends_after_the_highest_id() {
        let Json(created) = create_text_post(Json(TextPost {
            title: "Appended".into(),
            content: "body".into(),
        }))
        .await;
        assert_eq!(created.title, "Appended");

        let Json(posts) = list_text_posts(Query(ListParams { limit: None })).await;
        assert!(posts.iter().any(|p| p.title == "Appended"));
    }
}
