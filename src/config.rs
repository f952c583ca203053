use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// アプリケーション設定
///
/// 起動時に一度だけ構築し、AppState経由で各サービスへ渡す
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    /// 優先順（先頭から試行）
    pub models: Vec<String>,
    pub gemini_base_url: String,

    pub airtable_api_key: Option<String>,
    pub airtable_base_id: Option<String>,
    pub airtable_table_name: String,

    pub resend_api_key: Option<String>,
    pub alert_email_from: String,
    pub alert_email_to: Option<String>,

    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,

    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub timeout_seconds: u64,
    /// レコード保存を待つ上限（超過時は pending として応答）
    pub persist_wait_seconds: u64,

    pub bind_addr: String,
    pub body_limit_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            models: vec![
                "gemini-2.5-pro".into(),
                "gemini-2.5-flash".into(),
                "gemini-2.0-flash".into(),
            ],
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            airtable_api_key: None,
            airtable_base_id: None,
            airtable_table_name: "AnalysisResults".into(),
            resend_api_key: None,
            alert_email_from: "Camp Report <onboarding@resend.dev>".into(),
            alert_email_to: None,
            cloudinary_cloud_name: None,
            cloudinary_upload_preset: None,
            max_image_size: 1600,
            jpeg_quality: 70,
            timeout_seconds: 120,
            persist_wait_seconds: 8,
            bind_addr: "0.0.0.0:3000".into(),
            body_limit_mb: 25,
        }
    }
}

impl Config {
    /// 設定ファイル → .env → 環境変数 の順に読み込む
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        // .env が無いのは正常
        let _ = dotenvy::dotenv();
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("camp-report").join("config.json"))
    }

    /// 環境変数で上書き（取得関数を差し替えてテスト可能）
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(models) = get("GEMINI_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if !models.is_empty() {
                self.models = models;
            }
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.gemini_base_url = url;
        }
        if let Some(v) = get("AIRTABLE_API_KEY") {
            self.airtable_api_key = Some(v);
        }
        if let Some(v) = get("AIRTABLE_BASE_ID") {
            self.airtable_base_id = Some(v);
        }
        if let Some(v) = get("AIRTABLE_TABLE_NAME") {
            self.airtable_table_name = v;
        }
        if let Some(v) = get("RESEND_API_KEY") {
            self.resend_api_key = Some(v);
        }
        if let Some(v) = get("ALERT_EMAIL_FROM") {
            self.alert_email_from = v;
        }
        if let Some(v) = get("ALERT_EMAIL_TO") {
            self.alert_email_to = Some(v);
        }
        if let Some(v) = get("CLOUDINARY_CLOUD_NAME") {
            self.cloudinary_cloud_name = Some(v);
        }
        if let Some(v) = get("CLOUDINARY_UPLOAD_PRESET") {
            self.cloudinary_upload_preset = Some(v);
        }
        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(mb) = get("BODY_LIMIT_MB").and_then(|v| v.parse().ok()) {
            self.body_limit_mb = mb;
        }
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.gemini_api_key = Some(key);
        self.save()
    }

    pub fn has_model_key(&self) -> bool {
        self.gemini_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Airtable接続情報が揃っているか
    pub fn has_store(&self) -> bool {
        self.airtable_api_key.is_some()
            && self.airtable_base_id.is_some()
            && !self.airtable_table_name.trim().is_empty()
    }
}
