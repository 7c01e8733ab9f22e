use crate::error::ServiceError;
use crate::supabase::{check_status, SupabaseClient};
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Method};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Largest accepted upload: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Folder inside the bucket an image is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFolder {
    Covers,
    Gallery,
}

impl UploadFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFolder::Covers => "covers",
            UploadFolder::Gallery => "gallery",
        }
    }
}

/// Public file storage for post and content images.
#[derive(Debug, Clone)]
pub struct Storage {
    client: SupabaseClient,
    bucket: String,
}

impl Storage {
    pub fn new(client: SupabaseClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    pub fn with_token(&self, token: &str) -> Self {
        Self::new(self.client.with_token(token), &self.bucket)
    }

    /// Public URL of an object in the bucket.
    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.client.base_url(),
            self.bucket,
            object_path
        )
    }

    /// Validate and upload an image, returning its public URL.
    pub async fn upload_image(
        &self,
        folder: UploadFolder,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        validate_image(content_type, bytes.len())?;

        let object_path = object_path(folder, file_name);
        let response = self
            .client
            .request(
                Method::POST,
                &format!("/storage/v1/object/{}/{}", self.bucket, object_path),
            )
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        check_status(response, |status, body| {
            ServiceError::from_postgrest(status, body, None)
        })
        .await?;

        info!("Uploaded {} to bucket {}", object_path, self.bucket);
        Ok(self.public_url(&object_path))
    }
}

/// Reject anything that is not an image or is over the size limit.
pub fn validate_image(content_type: &str, size: usize) -> Result<(), ServiceError> {
    if !content_type.starts_with("image/") {
        return Err(ServiceError::Validation(
            "Please upload an image file".to_string(),
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ServiceError::Validation(
            "File size must be less than 5MB".to_string(),
        ));
    }
    Ok(())
}

/// `{folder}/{millis}-{random}.{ext}`, keeping the original extension.
pub fn object_path(folder: UploadFolder, file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    let random = Uuid::new_v4().simple().to_string();

    format!(
        "{}/{}-{}.{}",
        folder.as_str(),
        Utc::now().timestamp_millis(),
        &random[..8],
        ext
    )
}
