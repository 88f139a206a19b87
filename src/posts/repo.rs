use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::StoredObject;

/// Media classification derived once from the upload's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            FileType::Video
        } else {
            FileType::Image
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

/// One media post. `file_id` is the storage gateway's identifier for the
/// object; the row and the object live and die together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub file_id: String,
    pub created_at: OffsetDateTime,
}

impl Post {
    /// Insert and read back the canonical row in one statement, so the
    /// server-assigned `created_at` comes back with the result.
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        caption: &str,
        stored: &StoredObject,
        file_type: FileType,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, user_id, caption, url, file_type, file_name, file_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, caption, url, file_type, file_name, file_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(caption)
        .bind(&stored.url)
        .bind(file_type.as_str())
        .bind(&stored.name)
        .bind(&stored.file_id)
        .fetch_one(db)
        .await
    }

    /// Every post, newest first. Ties on `created_at` break by id so the
    /// order is stable across reads.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, caption, url, file_type, file_name, file_id, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, caption, url, file_type, file_name, file_id, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Returns the number of rows removed; 0 means somebody else deleted
    /// the post first.
    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_mime_types_classify_as_video() {
        assert_eq!(FileType::from_content_type("video/mp4"), FileType::Video);
        assert_eq!(FileType::from_content_type("video/webm"), FileType::Video);
    }

    #[test]
    fn everything_else_classifies_as_image() {
        assert_eq!(FileType::from_content_type("image/png"), FileType::Image);
        assert_eq!(FileType::from_content_type("image/jpeg"), FileType::Image);
        assert_eq!(
            FileType::from_content_type("application/octet-stream"),
            FileType::Image
        );
        assert_eq!(FileType::from_content_type("audio/mpeg"), FileType::Image);
    }

    #[test]
    fn file_type_round_trips_as_str() {
        assert_eq!(FileType::Video.as_str(), "video");
        assert_eq!(FileType::Image.as_str(), "image");
    }
}
