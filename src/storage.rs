use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

/// All uploads land under one logical folder in the bucket.
const UPLOAD_FOLDER: &str = "uploads";
/// Object tag marking where the upload came from.
const UPLOAD_TAGGING: &str = "source=backend-upload";

/// What the gateway hands back after a successful upload. `file_id` is the
/// gateway's own identifier for the object and is what `delete` expects.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub name: String,
    pub file_id: String,
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<StoredObject>;
    async fn delete(&self, file_id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
        public_base_url: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn upload(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        let name = unique_object_name(file_name);
        let key = format!("{}/{}", UPLOAD_FOLDER, name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .tagging(UPLOAD_TAGGING)
            .send()
            .await
            .with_context(|| format!("s3 put_object {}", key))?;

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            name,
            file_id: key,
        })
    }

    async fn delete(&self, file_id: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(file_id)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {}", file_id))?;
        Ok(())
    }
}

/// Two uploads with the same human-supplied name must never collide, so the
/// stored name always carries a fresh uuid next to the original stem.
fn unique_object_name(file_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}_{}.{}", stem, suffix, ext)
        }
        _ if !file_name.is_empty() => format!("{}_{}", file_name, suffix),
        _ => format!("upload_{}", suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_keeps_extension() {
        let name = unique_object_name("beach.png");
        assert!(name.starts_with("beach_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn unique_name_never_collides() {
        let a = unique_object_name("clip.mp4");
        let b = unique_object_name("clip.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn unique_name_without_extension() {
        let name = unique_object_name("README");
        assert!(name.starts_with("README_"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn unique_name_for_empty_input() {
        let name = unique_object_name("");
        assert!(name.starts_with("upload_"));
    }
}
