//! ダッシュボード表示用の派生データ

use crate::types::{AnalysisReport, Axis};
use serde::Serialize;

/// 高評価とみなす総合点
pub const HIGH_QUALITY_THRESHOLD: u8 = 80;

/// コメントに含まれると下降トレンドとみなす語
const NEGATIVE_MARKERS: &[&str] = &["부족", "아쉽", "낮"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// 指標カード1枚分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSummary {
    pub id: &'static str,
    pub label: &'static str,
    pub score: u8,
    pub comment: String,
    pub trend: Trend,
    pub description: &'static str,
}

fn axis_description(axis: Axis) -> &'static str {
    match axis {
        Axis::Vibe => "페이지 접속 시 고객의 시선을 얼마나 사로잡는지 보여줍니다.",
        Axis::Hygiene => "사진을 통해 전달되는 청결함을 보여줍니다.",
        Axis::Contents => "부대시설과 편의 시설의 상품 가치를 표현합니다.",
        Axis::Season => "시기별 썸네일 전략 등 마케팅 효율성을 나타냅니다.",
    }
}

/// コメント文面からトレンドを推定
pub fn trend_for(comment: &str) -> Trend {
    if NEGATIVE_MARKERS.iter().any(|m| comment.contains(m)) {
        Trend::Down
    } else {
        Trend::Up
    }
}

/// 4軸の指標カードを生成
pub fn metric_summaries(report: &AnalysisReport) -> Vec<MetricSummary> {
    Axis::ALL
        .iter()
        .map(|&axis| {
            let comment = report.evaluation.comment(axis).to_string();
            MetricSummary {
                id: axis.key(),
                label: axis.label(),
                score: report.evaluation.score(axis),
                trend: trend_for(&comment),
                comment,
                description: axis_description(axis),
            }
        })
        .collect()
}

pub fn is_high_quality(report: &AnalysisReport) -> bool {
    report.total_score >= HIGH_QUALITY_THRESHOLD
}

/// 100人中のクリック予想人数（総合点の段階で決まる）
pub fn estimated_clicks(total: u8) -> u8 {
    match total {
        85.. => 60,
        70..=84 => 40,
        50..=69 => 20,
        30..=49 => 10,
        _ => 5,
    }
}

/// 上位何%か（100 - 総合点）
pub fn percentile(total: u8) -> u8 {
    100u8.saturating_sub(total)
}
