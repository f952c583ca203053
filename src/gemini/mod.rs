//! Gemini API連携
//!
//! プロンプト＋インライン画像を generateContent に送り、テキスト応答を得る。
//! モデルは候補リストを先頭から試し、最初に非空テキストを返したものを採用する。

mod fallback;

pub use fallback::{try_in_order, Failure, FallbackError, Success};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// インライン送信する画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("model {model} returned HTTP {status}: {body}")]
    Status { model: String, status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("model {model} returned an empty response")]
    EmptyResponse { model: String },
}

/// マルチモーダル生成モデル
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        images: &[InlineImage],
    ) -> Result<String, ModelError>;
}

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// 先頭候補のテキストパートを連結
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

fn build_request(prompt: &str, images: &[InlineImage]) -> GeminiRequest {
    let mut parts: Vec<Part> = vec![Part::Text { text: prompt.to_string() }];
    for image in images {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: B64.encode(&image.data),
            },
        });
    }

    GeminiRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            temperature: 0.4,
            response_mime_type: "application/json".to_string(),
        },
    }
}

/// Gemini REST クライアント
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        images: &[InlineImage],
    ) -> Result<String, ModelError> {
        let request = build_request(prompt, images);

        let response = self
            .http
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                model: model.to_string(),
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        Ok(payload.text())
    }
}

/// 採用されたモデルと応答
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub model: String,
    pub text: String,
}

/// 候補モデルを順に試し、最初の非空応答を返す
pub async fn generate_with_fallback(
    client: &dyn GenerativeModel,
    candidates: &[String],
    prompt: &str,
    images: &[InlineImage],
) -> Result<ModelReply, FallbackError<ModelError>> {
    let success = try_in_order(candidates, |model| async move {
        tracing::debug!(model = model.as_str(), images = images.len(), "calling model");
        let text = client.generate(model, prompt, images).await?;
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse { model: model.clone() });
        }
        Ok(text)
    })
    .await?;

    Ok(ModelReply {
        model: success.candidate,
        text: success.value,
    })
}
