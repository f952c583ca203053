use crate::gemini::{FallbackError, ModelError};
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("画像がありません (no images provided)")]
    NoImages,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像取得エラー ({url}): {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("すべてのモデル呼び出しに失敗しました: {0}")]
    ModelExhausted(#[from] FallbackError<ModelError>),

    #[error("レコードストアエラー: {0}")]
    Store(#[from] StoreError),

    #[error("オブジェクトストレージエラー: {0}")]
    Storage(String),

    #[error("通知エラー: {0}")]
    Notify(String),

    #[error(transparent)]
    Common(#[from] camp_report_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
