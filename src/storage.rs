//! 画像のオブジェクトストレージ登録（Cloudinary unsigned upload）

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// アップロードして公開URLを返す
    async fn upload(&self, filename: &str, content_type: &str, data: Vec<u8>) -> Result<String>;
}

pub struct CloudinaryStorage {
    http: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
    api_base: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadError {
    message: String,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: String, upload_preset: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            cloud_name,
            upload_preset,
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/image/upload", self.api_base, self.cloud_name)
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, filename: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let file = Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone());

        let response = self.http.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        let payload: UploadResponse = response.json().await?;

        match (status.is_success(), payload.secure_url) {
            (true, Some(url)) => {
                tracing::info!(url = url.as_str(), "image uploaded");
                Ok(url)
            }
            (_, _) => {
                let message = payload
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "secure_url missing".to_string());
                Err(ReportError::Storage(format!("HTTP {}: {}", status.as_u16(), message)))
            }
        }
    }
}
