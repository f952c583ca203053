//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// モデル応答からJSONを復元できなかった（生テキスト先頭を保持）
    #[error("Parse error: {message} (response starts with: {raw_prefix:?})")]
    Parse { message: String, raw_prefix: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
