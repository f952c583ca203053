//! 表形式ストア（Airtable）とのフィールド変換
//!
//! フィールド名は既存スプレッドシートの列名と一致させる。
//! スコア・キャンプ場名・タグはフラットな列から厳密に復元する。
//! 軸ごとのコメントやランキングは `Report JSON` 列からのみ復元でき、
//! 列が無いレコードでは空になる。

use crate::error::{Error, Result};
use crate::types::{AnalysisReport, Axis, SiteTags};
use serde_json::{Map, Value};

pub const FIELD_CAMPING_NAME: &str = "Camping Name";
pub const FIELD_ADDRESS: &str = "Address";
pub const FIELD_TOTAL_SCORE: &str = "Total Score";
pub const FIELD_LEISURE_TAGS: &str = "Leisure Tags";
pub const FIELD_FACILITY_TAGS: &str = "Facility Tags";
pub const FIELD_ACTIVITY_TAGS: &str = "Activity Tags";
pub const FIELD_PHOTO_COUNT: &str = "Photo Count";
pub const FIELD_ONE_LINE_INTRO: &str = "One Line Intro";
pub const FIELD_MARKETING_COMMENT: &str = "Marketing Comment";
pub const FIELD_DESCRIPTION: &str = "Description";
pub const FIELD_REPORT_JSON: &str = "Report JSON";
pub const FIELD_CREATED_AT: &str = "Created At";

/// 軸ごとのスコア列名
pub fn score_field(axis: Axis) -> &'static str {
    match axis {
        Axis::Vibe => "Vibe Score",
        Axis::Hygiene => "Hygiene Score",
        Axis::Contents => "Contents Score",
        Axis::Season => "Season Score",
    }
}

/// レポートをフラットなフィールド集合に変換
pub fn to_record_fields(report: &AnalysisReport) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    fields.insert(FIELD_CAMPING_NAME.into(), Value::from(report.camping_name.clone()));
    fields.insert(FIELD_ADDRESS.into(), Value::from(report.address.clone()));
    fields.insert(FIELD_TOTAL_SCORE.into(), Value::from(report.total_score));
    for axis in Axis::ALL {
        fields.insert(score_field(axis).into(), Value::from(report.evaluation.score(axis)));
    }
    fields.insert(FIELD_LEISURE_TAGS.into(), Value::from(report.tags.leisure.clone()));
    fields.insert(FIELD_FACILITY_TAGS.into(), Value::from(report.tags.facility.clone()));
    fields.insert(FIELD_ACTIVITY_TAGS.into(), Value::from(report.tags.activity.clone()));
    fields.insert(FIELD_PHOTO_COUNT.into(), Value::from(report.photo_count));
    fields.insert(FIELD_ONE_LINE_INTRO.into(), Value::from(report.one_line_intro.clone()));
    fields.insert(FIELD_MARKETING_COMMENT.into(), Value::from(report.marketing_comment.clone()));
    fields.insert(FIELD_DESCRIPTION.into(), Value::from(report.description.clone()));
    fields.insert(FIELD_REPORT_JSON.into(), Value::from(serde_json::to_string(report)?));
    Ok(fields)
}

/// フィールド集合からレポートを復元
pub fn from_record_fields(fields: &Map<String, Value>) -> Result<AnalysisReport> {
    // Report JSON があればテキスト項目の復元元にする
    let mut report = match fields.get(FIELD_REPORT_JSON).and_then(Value::as_str) {
        Some(json) => serde_json::from_str::<AnalysisReport>(json).unwrap_or_default(),
        None => AnalysisReport::default(),
    };

    report.camping_name = get_str(fields, FIELD_CAMPING_NAME);
    report.address = get_str(fields, FIELD_ADDRESS);
    report.total_score = get_score(fields, FIELD_TOTAL_SCORE)?;
    for axis in Axis::ALL {
        let score = get_score(fields, score_field(axis))?;
        report.evaluation.set_score(axis, score);
    }
    report.tags = SiteTags {
        leisure: get_tags(fields, FIELD_LEISURE_TAGS),
        facility: get_tags(fields, FIELD_FACILITY_TAGS),
        activity: get_tags(fields, FIELD_ACTIVITY_TAGS),
    };
    report.photo_count = fields
        .get(FIELD_PHOTO_COUNT)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(report.photo_count);

    if let Some(intro) = fields.get(FIELD_ONE_LINE_INTRO).and_then(Value::as_str) {
        report.one_line_intro = intro.to_string();
    }
    if let Some(comment) = fields.get(FIELD_MARKETING_COMMENT).and_then(Value::as_str) {
        report.marketing_comment = comment.to_string();
    }
    if let Some(description) = fields.get(FIELD_DESCRIPTION).and_then(Value::as_str) {
        report.description = description.to_string();
    }
    report.mock = false;

    Ok(report)
}

fn get_str(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn get_score(fields: &Map<String, Value>, key: &str) -> Result<u8> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_f64()
            .map(crate::scoring::clamp_score)
            .ok_or_else(|| Error::Validation(format!("{} is not a number: {}", key, value))),
    }
}

/// 複数選択（配列）とカンマ区切り文字列の両方を受け付ける
fn get_tags(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
