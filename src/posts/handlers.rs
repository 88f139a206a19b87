use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::instrument;

use super::dto::{DeleteResponse, FeedResponse, UploadResponse};
use super::services::{self, NewUpload};
use crate::auth::jwt::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /upload — multipart `file` (required) + `caption` (optional).
#[instrument(skip(state, mp))]
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<NewUpload> = None;
    let mut caption = String::new();

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file: {}", e)))?;
                upload = Some(NewUpload {
                    bytes,
                    file_name,
                    content_type,
                    caption: String::new(),
                });
            }
            Some("caption") => {
                caption = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read caption: {}", e)))?;
            }
            _ => {}
        }
    }

    let mut upload = upload.ok_or_else(|| AppError::Validation("file is required".into()))?;
    upload.caption = caption;

    let post = services::create_post(&state, user_id, upload).await?;

    Ok(Json(UploadResponse {
        post_id: post.id,
        url: post.url,
        file_id: post.file_id,
        caption: post.caption,
    }))
}

/// GET /feed — every post, newest first, joined with owner emails.
#[instrument(skip(state))]
pub async fn feed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FeedResponse>, AppError> {
    let posts = services::get_feed(&state, user_id).await?;
    Ok(Json(FeedResponse { posts }))
}

/// DELETE /posts/:id — ownership-checked delete across storage and database.
#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    services::delete_post(&state, user_id, &post_id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Post deleted successfully".into(),
    }))
}
