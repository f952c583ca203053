use super::{ApiError, AppState};
use crate::analyzer::{detect_mime, AnalysisRequest, ImageSource};
use crate::gemini::InlineImage;
use crate::service::{run_analysis, AnalysisResponse};
use crate::store::{self, SyncStatus};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use camp_report_common::{decode_report, AnalysisReport, LeadAction, SiteMeta};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::instrument;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(flatten)]
    pub site: SiteMeta,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// 画像URLを受け取って診断
#[instrument(skip_all)]
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> ApiResult<AnalysisResponse> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let images = body
        .image_urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .map(ImageSource::Url)
        .collect();
    let request = AnalysisRequest { site: body.site, images };

    respond(&state, &request).await
}

/// マルチパートで画像本体を受け取って診断
#[instrument(skip_all)]
pub async fn analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<AnalysisResponse> {
    let mut site = SiteMeta::default();
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" | "images" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if data.is_empty() {
                    continue;
                }
                let mime_type = detect_mime(&data, content_type.as_deref());
                images.push(ImageSource::Inline(InlineImage {
                    mime_type,
                    data: data.to_vec(),
                }));
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                apply_text_field(&mut site, &name, &text);
            }
        }
    }

    let request = AnalysisRequest { site, images };
    respond(&state, &request).await
}

/// テキスト項目をメタデータへ反映（タグは複数回指定・カンマ区切りの両方に対応）
fn apply_text_field(site: &mut SiteMeta, name: &str, value: &str) {
    let tags = |value: &str| -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    };

    match name {
        "campingName" => site.camping_name = value.trim().to_string(),
        "address" => site.address = value.trim().to_string(),
        "leisure" => site.tags.leisure.extend(tags(value)),
        "facility" => site.tags.facility.extend(tags(value)),
        "activity" => site.tags.activity.extend(tags(value)),
        other => tracing::debug!(field = other, "ignoring unknown form field"),
    }
}

async fn respond(state: &AppState, request: &AnalysisRequest) -> ApiResult<AnalysisResponse> {
    tracing::info!(
        camping_name = request.site.camping_name.as_str(),
        images = request.images.len(),
        "analysis requested"
    );
    let response = run_analysis(
        &state.analyzer,
        state.store.clone(),
        state.notifier.clone(),
        state.persist_wait,
        request,
    )
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordBody {
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, bool>,
    pub field_name: Option<String>,
    pub value: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateRecordResponse {
    pub success: bool,
    pub message: String,
}

impl UpdateRecordBody {
    /// 更新対象のフィールド名と値（アクションIDはフィールド名に変換）
    fn flags(&self) -> BTreeMap<String, bool> {
        let mut flags: BTreeMap<String, bool> = self
            .fields
            .iter()
            .map(|(name, value)| (resolve_field_name(name), *value))
            .collect();
        if let Some(name) = self.field_name.as_deref().filter(|n| !n.trim().is_empty()) {
            flags.insert(resolve_field_name(name), self.value.unwrap_or(true));
        }
        flags
    }
}

fn resolve_field_name(name: &str) -> String {
    match name.trim().parse::<LeadAction>() {
        Ok(action) => action.field_name().to_string(),
        Err(_) => name.trim().to_string(),
    }
}

/// 後続アクションのフラグ更新（POST / PATCH 共通）
#[instrument(skip_all)]
pub async fn update_record(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRecordBody>, JsonRejection>,
) -> ApiResult<UpdateRecordResponse> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let record_id = body.record_id.trim();
    if record_id.is_empty() {
        return Err(ApiError::BadRequest("recordId が必要です".to_string()));
    }
    let flags = body.flags();
    if flags.is_empty() {
        return Err(ApiError::BadRequest("更新するフィールドがありません".to_string()));
    }

    let record_store = state.store.as_ref().ok_or(ApiError::NotConfigured("Airtable"))?;
    store::update_fields(record_store.as_ref(), record_id, &flags).await?;

    Ok(Json(UpdateRecordResponse {
        success: true,
        message: format!("{}件のフィールドを更新しました", flags.len()),
    }))
}

/// 保存済みレポートの読み出し
#[instrument(skip_all)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AnalysisResponse> {
    let record_store = state.store.as_ref().ok_or(ApiError::NotConfigured("Airtable"))?;
    let report = store::load_report(record_store.as_ref(), &id).await?;
    Ok(Json(AnalysisResponse::new(report, &SyncStatus::Synced { record_id: id })))
}

/// 共有トークンからレポートを復元
pub async fn get_shared(Path(token): Path<String>) -> ApiResult<AnalysisReport> {
    Ok(Json(decode_report(&token)?))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// 画像をオブジェクトストレージへ登録してURLを返す
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let storage = state.storage.clone().ok_or(ApiError::NotConfigured("Cloudinary"))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.jpg").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if data.is_empty() {
            break;
        }
        let mime_type = detect_mime(&data, content_type.as_deref());
        let url = storage.upload(&filename, &mime_type, data.to_vec()).await?;
        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::BadRequest("file フィールドがありません".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_text_field_tags() {
        let mut site = SiteMeta::default();
        apply_text_field(&mut site, "campingName", " 솔숲캠핑장 ");
        apply_text_field(&mut site, "leisure", "계곡, 낚시");
        apply_text_field(&mut site, "leisure", "등산");
        apply_text_field(&mut site, "unknown", "x");
        assert_eq!(site.camping_name, "솔숲캠핑장");
        assert_eq!(site.tags.leisure, vec!["계곡", "낚시", "등산"]);
        assert!(site.tags.facility.is_empty());
    }

    #[test]
    fn test_update_body_flags() {
        let body: UpdateRecordBody = serde_json::from_str(
            r#"{"recordId": "rec1", "fields": {"coupon": true}, "fieldName": "기획전_신청"}"#,
        )
        .unwrap();
        let flags = body.flags();
        assert_eq!(flags.get("쿠폰 할인 긍정"), Some(&true));
        assert_eq!(flags.get("기획전_신청"), Some(&true));
    }

    #[test]
    fn test_analyze_body_flattens_site() {
        let body: AnalyzeBody = serde_json::from_str(
            r#"{"campingName": "A", "tags": {"leisure": ["계곡"]}, "imageUrls": ["https://img.test/1.jpg"]}"#,
        )
        .unwrap();
        assert_eq!(body.site.camping_name, "A");
        assert_eq!(body.site.tags.leisure, vec!["계곡"]);
        assert_eq!(body.image_urls.len(), 1);
    }
}
