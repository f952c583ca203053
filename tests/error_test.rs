//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use camp_report::error::ReportError;
use camp_report::gemini::{FallbackError, Failure, ModelError};
use camp_report::scanner;
use camp_report::store::StoreError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(ReportError::FolderNotFound(_))));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    // テキストファイルのみ作成
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path());
    assert!(result.unwrap().is_empty());
}

/// ReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ReportError::Config("テスト設定エラー".to_string()),
        ReportError::NoImages,
        ReportError::FolderNotFound("/path/to/folder".to_string()),
        ReportError::ImageLoad("decode failed".to_string()),
        ReportError::ImageFetch {
            url: "https://img.test/a.jpg".to_string(),
            reason: "HTTP 404".to_string(),
        },
        ReportError::Storage("upload failed".to_string()),
        ReportError::Notify("HTTP 401".to_string()),
        ReportError::Store(StoreError::NotConfigured),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

#[test]
fn test_model_exhausted_message_uses_last_failure() {
    let err = ReportError::from(FallbackError {
        failures: vec![
            Failure {
                candidate: "gemini-2.5-pro".to_string(),
                error: ModelError::Request("timeout".to_string()),
            },
            Failure {
                candidate: "gemini-2.5-flash".to_string(),
                error: ModelError::EmptyResponse {
                    model: "gemini-2.5-flash".to_string(),
                },
            },
        ],
    });

    let message = err.to_string();
    assert!(message.contains("2 candidate(s) failed"));
    assert!(message.contains("gemini-2.5-flash"));
    assert!(!message.contains("timeout"));
}

#[test]
fn test_common_error_is_transparent() {
    let err = ReportError::from(camp_report_common::Error::Validation("ranking must be an array".into()));
    assert_eq!(err.to_string(), "Validation error: ranking must be an array");
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ReportError = io_error.into();
    assert!(matches!(err, ReportError::Io(_)));
}

/// JSONパースエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
    let err: ReportError = json_error.into();
    assert!(matches!(err, ReportError::JsonParse(_)));
}

/// ストア未設定はAPIキー不足ではなく未設定として報告する
#[test]
fn test_store_not_configured_message() {
    let error = ReportError::Store(StoreError::NotConfigured);
    let message = error.to_string();
    assert!(message.contains("レコードストアが設定されていません"), "{}", message);
    assert!(!message.contains("APIキー"), "{}", message);
}
