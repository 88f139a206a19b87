use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub post_id: Uuid,
    pub url: String,
    pub file_id: String,
    pub caption: String,
}

/// A post as feed consumers see it: the row plus the resolved owner email
/// and whether the requesting user owns it.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_owner: bool,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedItem>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn feed_item_serializes_created_at_as_rfc3339() {
        let item = FeedItem {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            caption: "sunset".into(),
            url: "https://cdn.local/uploads/a.png".into(),
            file_type: "image".into(),
            file_name: "a.png".into(),
            created_at: datetime!(2024-05-01 12:30:00 UTC),
            is_owner: true,
            email: "owner@example.com".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T12:30:00Z");
        assert_eq!(json["is_owner"], true);
        assert_eq!(json["file_type"], "image");
    }
}
