//! 診断＋保存の一連の処理

use crate::analyzer::{AnalysisRequest, Analyzer};
use crate::error::Result;
use crate::notify::Notifier;
use crate::store::{persist_detached, spawn_persist, RecordStore, SyncStatus};
use camp_report_common::AnalysisReport;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// クライアントへ返す診断結果
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(rename = "recordId", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub sync_status: &'static str,
    /// 保存に失敗しても診断結果自体は返す
    pub sync_failed: bool,
}

impl AnalysisResponse {
    pub fn new(report: AnalysisReport, status: &SyncStatus) -> Self {
        Self {
            report,
            record_id: status.record_id().map(str::to_string),
            sync_status: status.as_str(),
            sync_failed: status.is_failed(),
        }
    }
}

/// 診断を実行し、モックでなければ保存する
pub async fn run_analysis(
    analyzer: &Analyzer,
    store: Option<Arc<dyn RecordStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    persist_wait: Duration,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse> {
    let report = analyzer.analyze(request).await?;

    let status = if report.mock {
        SyncStatus::Skipped
    } else {
        persist_detached(store, notifier, report.clone(), persist_wait).await
    };

    if status.is_failed() {
        tracing::warn!(camping_name = report.camping_name.as_str(), "returning report with sync_failed");
    }

    Ok(AnalysisResponse::new(report, &status))
}

/// 診断後、保存が完了するまで待つ（CLI用）
///
/// `persist_wait` を過ぎたら進捗をログに出し、そのまま完了を待つ。
/// 戻った時点で保存タスクは必ず終わっている。
pub async fn run_analysis_until_saved(
    analyzer: &Analyzer,
    store: Option<Arc<dyn RecordStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    persist_wait: Duration,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse> {
    let report = analyzer.analyze(request).await?;

    let status = match store {
        Some(store) if !report.mock => {
            let mut task = spawn_persist(store, notifier, report.clone());
            match task.wait(persist_wait).await {
                SyncStatus::Pending => {
                    tracing::info!("waiting for save to finish");
                    task.join().await
                }
                status => status,
            }
        }
        Some(_) => SyncStatus::Skipped,
        None => {
            tracing::warn!("record store not configured, skipping save");
            SyncStatus::Skipped
        }
    };

    Ok(AnalysisResponse::new(report, &status))
}
