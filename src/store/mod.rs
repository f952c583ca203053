//! 診断結果レコードの保存
//!
//! 表形式ストアへの作成・取得・部分更新と、リクエストから切り離した保存タスク。

mod airtable;

pub use airtable::AirtableStore;

use crate::notify::Notifier;
use async_trait::async_trait;
use camp_report_common::record::{from_record_fields, to_record_fields, FIELD_CREATED_AT};
use camp_report_common::AnalysisReport;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("レコードが見つかりません: {0}")]
    NotFound(String),

    #[error("レコードストアが設定されていません")]
    NotConfigured,

    #[error("ストアがHTTP {status}を返しました: {body}")]
    Status { status: u16, body: String },

    #[error("ストアへのリクエストに失敗しました: {0}")]
    Request(String),

    #[error("ストア応答の解析に失敗しました: {0}")]
    Decode(String),
}

pub type Fields = Map<String, Value>;

/// 表形式のレコードストア
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 新規作成し、レコードIDを返す
    async fn create(&self, fields: Fields) -> Result<String, StoreError>;

    async fn get(&self, record_id: &str) -> Result<Fields, StoreError>;

    /// 指定フィールドのみ更新（他フィールドは保持）
    async fn update(&self, record_id: &str, fields: Fields) -> Result<(), StoreError>;
}

/// レポートを1レコードとして保存
pub async fn save_report(
    store: &dyn RecordStore,
    report: &AnalysisReport,
) -> crate::error::Result<String> {
    let mut fields = to_record_fields(report)?;
    fields.insert(
        FIELD_CREATED_AT.to_string(),
        Value::from(chrono::Utc::now().to_rfc3339()),
    );
    let record_id = store.create(fields).await?;
    tracing::info!(record_id = record_id.as_str(), "report saved");
    Ok(record_id)
}

pub async fn load_report(
    store: &dyn RecordStore,
    record_id: &str,
) -> crate::error::Result<AnalysisReport> {
    let fields = store.get(record_id).await?;
    Ok(from_record_fields(&fields)?)
}

/// 真偽値フィールドの部分更新
pub async fn update_fields(
    store: &dyn RecordStore,
    record_id: &str,
    flags: &BTreeMap<String, bool>,
) -> crate::error::Result<()> {
    let fields: Fields = flags
        .iter()
        .map(|(name, value)| (name.clone(), Value::Bool(*value)))
        .collect();
    store.update(record_id, fields).await?;
    tracing::info!(record_id, fields = ?flags.keys().collect::<Vec<_>>(), "record updated");
    Ok(())
}

/// 保存処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced { record_id: String },
    Failed,
    /// 待機時間内に完了せず、タスクはバックグラウンドで継続中
    Pending,
    /// ストア未設定
    Skipped,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced { .. } => "synced",
            SyncStatus::Failed => "failed",
            SyncStatus::Pending => "pending",
            SyncStatus::Skipped => "skipped",
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            SyncStatus::Synced { record_id } => Some(record_id),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncStatus::Failed)
    }
}

/// 保存をリクエスト処理から切り離して実行する
///
/// タスク内で失敗をログと通知まで済ませるため、待機を打ち切っても結果は失われない。
/// ランタイムが動き続ける前提（サーバー）。CLI は [`PersistTask::join`] で完了を待つこと。
pub async fn persist_detached(
    store: Option<Arc<dyn RecordStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    report: AnalysisReport,
    wait: Duration,
) -> SyncStatus {
    let Some(store) = store else {
        tracing::warn!("record store not configured, skipping save");
        return SyncStatus::Skipped;
    };

    spawn_persist(store, notifier, report).wait(wait).await
}

/// バックグラウンドで実行中の保存タスク
///
/// drop してもタスクは止まらない（ランタイムが生きている間は継続）。
pub struct PersistTask {
    handle: JoinHandle<Option<String>>,
    finished: Option<SyncStatus>,
}

/// 保存タスクを起動する
pub fn spawn_persist(
    store: Arc<dyn RecordStore>,
    notifier: Option<Arc<dyn Notifier>>,
    report: AnalysisReport,
) -> PersistTask {
    let handle = tokio::spawn(async move {
        match save_report(store.as_ref(), &report).await {
            Ok(record_id) => Some(record_id),
            Err(e) => {
                tracing::error!(error = %e, camping_name = report.camping_name.as_str(), "failed to save report");
                match notifier {
                    Some(notifier) => {
                        let subject = format!("[camp-report] 保存失敗: {}", report.camping_name);
                        let body = failure_body(&report, &e.to_string());
                        if let Err(notify_err) = notifier.notify(&subject, &body).await {
                            tracing::error!(error = %notify_err, "failed to send alert email");
                        }
                    }
                    None => tracing::warn!("notifier not configured, alert skipped"),
                }
                None
            }
        }
    });

    PersistTask {
        handle,
        finished: None,
    }
}

impl PersistTask {
    /// 最大 `wait` だけ完了を待つ。間に合わなければ Pending
    pub async fn wait(&mut self, wait: Duration) -> SyncStatus {
        if let Some(status) = &self.finished {
            return status.clone();
        }
        match tokio::time::timeout(wait, &mut self.handle).await {
            Ok(joined) => {
                let status = status_of(joined);
                self.finished = Some(status.clone());
                status
            }
            Err(_) => {
                tracing::warn!(wait_secs = wait.as_secs_f64(), "save still running, responding as pending");
                SyncStatus::Pending
            }
        }
    }

    /// 完了まで待つ
    pub async fn join(self) -> SyncStatus {
        match self.finished {
            Some(status) => status,
            None => status_of(self.handle.await),
        }
    }
}

fn status_of(joined: std::result::Result<Option<String>, JoinError>) -> SyncStatus {
    match joined {
        Ok(Some(record_id)) => SyncStatus::Synced { record_id },
        Ok(None) => SyncStatus::Failed,
        Err(join_err) => {
            tracing::error!(error = %join_err, "save task aborted");
            SyncStatus::Failed
        }
    }
}

fn failure_body(report: &AnalysisReport, error: &str) -> String {
    let report_json = serde_json::to_string_pretty(report).unwrap_or_default();
    format!(
        "캠핑장: {}\n주소: {}\n총점: {}\n오류: {}\n\n{}",
        report.camping_name, report.address, report.total_score, error, report_json
    )
}
