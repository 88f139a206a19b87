use std::collections::HashMap;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::FeedItem;
use super::repo::{FileType, Post};
use crate::auth::repo::User;
use crate::error::AppError;
use crate::state::AppState;

/// A validated multipart upload, ready to hand to the lifecycle service.
pub struct NewUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
    pub caption: String,
}

/// Upload the media object, then create the post row. Storage goes first:
/// a failed upload must leave no database row behind.
pub async fn create_post(
    state: &AppState,
    user_id: Uuid,
    upload: NewUpload,
) -> Result<Post, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".into()));
    }
    if upload.content_type.is_empty() {
        return Err(AppError::Validation("content type is required".into()));
    }

    let stored = state
        .storage
        .upload(&upload.file_name, upload.bytes, &upload.content_type)
        .await
        .map_err(AppError::Storage)?;

    let file_type = FileType::from_content_type(&upload.content_type);

    let post = match Post::insert(&state.db, user_id, &upload.caption, &stored, file_type).await {
        Ok(p) => p,
        Err(e) => {
            // The object already made it to storage; nothing compensates
            // for it, so leave a trail for reconciliation by hand.
            warn!(
                file_id = %stored.file_id,
                error = %e,
                "post insert failed after storage upload; stored object orphaned"
            );
            return Err(AppError::Database(e));
        }
    };

    info!(
        post_id = %post.id,
        user_id = %user_id,
        file_type = file_type.as_str(),
        "post created"
    );
    Ok(post)
}

/// Full scan-and-join: every post newest-first, every user's email, merged
/// in memory. Unpaginated, which only holds up at small scale.
pub async fn get_feed(state: &AppState, user_id: Uuid) -> Result<Vec<FeedItem>, AppError> {
    let posts = Post::list_all(&state.db).await?;
    let emails: HashMap<Uuid, String> = User::list_emails(&state.db).await?.into_iter().collect();
    Ok(build_feed_items(posts, &emails, user_id))
}

/// Placeholder email when a post's owner can no longer be resolved; the
/// feed tolerates referential drift instead of failing outright.
const UNKNOWN_EMAIL: &str = "Unknown";

fn build_feed_items(
    posts: Vec<Post>,
    emails: &HashMap<Uuid, String>,
    principal: Uuid,
) -> Vec<FeedItem> {
    posts
        .into_iter()
        .map(|post| FeedItem {
            is_owner: post.user_id == principal,
            email: emails
                .get(&post.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
            id: post.id,
            user_id: post.user_id,
            caption: post.caption,
            url: post.url,
            file_type: post.file_type,
            file_name: post.file_name,
            created_at: post.created_at,
        })
        .collect()
}

/// Ownership-checked delete across storage and database. The object goes
/// first; if the row delete then fails, the dangling record is logged and
/// left for reconciliation by hand.
pub async fn delete_post(state: &AppState, user_id: Uuid, post_id: &str) -> Result<(), AppError> {
    let id = Uuid::parse_str(post_id)
        .map_err(|_| AppError::Validation(format!("invalid post id: {}", post_id)))?;

    let post = Post::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    // Existence is confirmed before ownership is checked.
    if post.user_id != user_id {
        return Err(AppError::Forbidden(
            "You dont have permission to delete this post",
        ));
    }

    state
        .storage
        .delete(&post.file_id)
        .await
        .map_err(AppError::Storage)?;

    let removed = match Post::delete_by_id(&state.db, id).await {
        Ok(n) => n,
        Err(e) => {
            warn!(
                post_id = %id,
                file_id = %post.file_id,
                error = %e,
                "row delete failed after storage delete; record dangling"
            );
            return Err(AppError::Database(e));
        }
    };
    if removed == 0 {
        // Lost the race against a concurrent delete of the same post.
        return Err(AppError::NotFound("Post not found"));
    }

    info!(post_id = %id, user_id = %user_id, "post deleted");
    Ok(())
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn png_upload(bytes: Bytes, content_type: &str) -> NewUpload {
        NewUpload {
            bytes,
            file_name: "a.png".into(),
            content_type: content_type.into(),
            caption: String::new(),
        }
    }

    // These all fail before the first storage or database call, so the
    // fake state's lazy pool is never touched.

    #[tokio::test]
    async fn delete_rejects_malformed_post_id() {
        let state = AppState::fake();
        let err = delete_post(&state, Uuid::new_v4(), "not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_empty_file() {
        let state = AppState::fake();
        let err = create_post(&state, Uuid::new_v4(), png_upload(Bytes::new(), "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_missing_content_type() {
        let state = AppState::fake();
        let err = create_post(
            &state,
            Uuid::new_v4(),
            png_upload(Bytes::from_static(b"not empty"), ""),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
