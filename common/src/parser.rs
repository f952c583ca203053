//! モデル応答パーサー
//!
//! モデルの自由テキスト応答からJSONオブジェクトを復元し、
//! 型付きの AnalysisReport に検証・変換する。
//!
//! 復元手順:
//! 1. ``` / ```json のフェンスを除去
//! 2. 最初の `{` から最後の `}` までを切り出す
//! 3. JSONとしてパース（失敗時は生テキスト先頭を含むエラー）

use crate::error::{Error, Result};
use crate::scoring::{clamp_score, total_for};
use crate::types::{AnalysisReport, Axis, Evaluation, PhotoCategory, PhotoRanking};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

/// エラーに含める生テキストの文字数
pub const RAW_PREFIX_CHARS: usize = 200;

/// ベストフォトの最大件数
pub const MAX_RANKING: usize = 3;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z]*").unwrap();
}

/// コードフェンス記号を除去
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").into_owned()
}

/// 最初の `{` から最後の `}` までを切り出す
///
/// どちらかが見つからない場合はフェンス除去後のテキストをtrimして返す
///
/// # Examples
/// ```
/// use camp_report_common::extract_json_object;
///
/// let text = "Here you go:\n```json\n{\"total_score\": 80}\n```";
/// assert_eq!(extract_json_object(text), "{\"total_score\": 80}");
/// ```
pub fn extract_json_object(text: &str) -> String {
    let stripped = strip_code_fences(text);
    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if end > start => stripped[start..=end].to_string(),
        _ => stripped.trim().to_string(),
    }
}

/// テキストからJSON値を復元
pub fn parse_json_object(text: &str) -> Result<Value> {
    let candidate = extract_json_object(text);
    serde_json::from_str(&candidate).map_err(|e| Error::Parse {
        message: e.to_string(),
        raw_prefix: text.chars().take(RAW_PREFIX_CHARS).collect(),
    })
}

/// モデル応答をパースしてレポートに変換
pub fn parse_report(text: &str) -> Result<AnalysisReport> {
    let value = parse_json_object(text)?;
    validate_report(&value)
}

/// JSON値を検証し、欠損フィールドを既定値で補完したレポートを返す
///
/// - トップレベルはオブジェクト必須
/// - スコアは数値・数値文字列を受け付け、0〜100に丸める（欠損は0）
/// - 旧形式 `metrics.{axis}.{score, comment}` も受け付ける
/// - 総合点はモデルの値を使わず重み付き平均で再計算する
pub fn validate_report(value: &Value) -> Result<AnalysisReport> {
    let Some(map) = value.as_object() else {
        return Err(Error::Validation(format!(
            "JSON object expected, got {}",
            type_name(value)
        )));
    };

    let evaluation = parse_evaluation(map);
    let ranking = match map.get("ranking") {
        Some(Value::Array(items)) => parse_ranking(items),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(Error::Validation(format!(
                "ranking must be an array, got {}",
                type_name(other)
            )))
        }
    };

    Ok(AnalysisReport {
        total_score: total_for(&evaluation),
        evaluation,
        ranking,
        marketing_comment: get_string(map, "marketing_comment").unwrap_or_default(),
        upsell_needed: get_bool(map, "upsell_needed").unwrap_or(false),
        description: get_string(map, "description").unwrap_or_default(),
        one_line_intro: get_string(map, "one_line_intro").unwrap_or_default(),
        ..Default::default()
    })
}

fn parse_evaluation(map: &Map<String, Value>) -> Evaluation {
    let mut evaluation = Evaluation::default();
    let eval_map = map.get("evaluation").and_then(Value::as_object);
    let metrics_map = map.get("metrics").and_then(Value::as_object);

    for axis in Axis::ALL {
        let key = axis.key();
        let score_key = format!("{}_score", key);

        let mut comment = eval_map.and_then(|m| get_string(m, key));
        let mut score = eval_map.and_then(|m| get_number(m, &score_key));

        // 旧形式: metrics.vibe = { score, comment }
        if let Some(metric) = metrics_map.and_then(|m| m.get(key)).and_then(Value::as_object) {
            comment = comment.or_else(|| get_string(metric, "comment"));
            score = score.or_else(|| get_number(metric, "score"));
        }

        evaluation.set_comment(axis, comment.unwrap_or_default());
        evaluation.set_score(axis, score.map(clamp_score).unwrap_or(0));
    }

    evaluation
}

fn parse_ranking(items: &[Value]) -> Vec<PhotoRanking> {
    let mut ranking: Vec<PhotoRanking> = items
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(i, item)| {
            let filename = get_string(item, "filename")
                .or_else(|| get_string(item, "fileName"))
                .unwrap_or_default();
            let rank = get_number(item, "rank")
                .map(clamp_score)
                .filter(|r| *r > 0)
                .unwrap_or((i + 1).min(u8::MAX as usize) as u8);
            PhotoRanking {
                rank,
                filename,
                category: get_string(item, "category")
                    .map(|c| PhotoCategory::from(c.as_str()))
                    .unwrap_or_default(),
                reason: get_string(item, "reason").unwrap_or_default(),
                image_url: None,
            }
        })
        .filter(|r| !r.filename.is_empty())
        .collect();

    ranking.sort_by_key(|r| r.rank);
    ranking.truncate(MAX_RANKING);
    ranking
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key)?;
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if value.is_null() {
        return None;
    }
    Some(value.to_string())
}

fn get_number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = map.get(key)?;
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    value.as_str().and_then(|s| s.trim().parse::<f64>().ok())
}

fn get_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    let value = map.get(key)?;
    if let Some(b) = value.as_bool() {
        return Some(b);
    }
    if let Some(s) = value.as_str() {
        return Some(matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"));
    }
    None
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
