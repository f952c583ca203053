//! 画像URLの取得

use crate::error::{ReportError, Result};
use crate::gemini::InlineImage;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::time::Duration;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<InlineImage>;
}

pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<InlineImage> {
        let fetch_err = |reason: String| ReportError::ImageFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status.as_u16())));
        }

        let header_mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_string());

        let data = response.bytes().await.map_err(|e| fetch_err(e.to_string()))?.to_vec();
        if data.is_empty() {
            return Err(fetch_err("empty body".to_string()));
        }

        let mime_type = detect_mime(&data, header_mime.as_deref());
        Ok(InlineImage { mime_type, data })
    }
}

/// 中身から判定し、判定できなければ Content-Type を使う
pub fn detect_mime(data: &[u8], header: Option<&str>) -> String {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type().to_string();
    }
    match header {
        Some(mime) if mime.starts_with("image/") => mime.to_string(),
        _ => "image/jpeg".to_string(),
    }
}

/// 全URLを並行取得（順序は入力通り、1件でも失敗したら全体失敗）
pub async fn fetch_all(fetcher: &dyn ImageFetcher, urls: &[String]) -> Result<Vec<InlineImage>> {
    try_join_all(urls.iter().map(|url| fetcher.fetch(url))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_from_magic_bytes() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(detect_mime(&png_magic, Some("application/octet-stream")), "image/png");
    }

    #[test]
    fn test_detect_mime_falls_back_to_header() {
        assert_eq!(detect_mime(b"????", Some("image/webp")), "image/webp");
        assert_eq!(detect_mime(b"????", Some("text/html")), "image/jpeg");
        assert_eq!(detect_mime(b"????", None), "image/jpeg");
    }
}
