//! スコア計算
//!
//! 総合点 = round(0.35·vibe + 0.25·hygiene + 0.25·contents + 0.15·season)

use crate::types::{Axis, Evaluation};

/// 任意の数値を0〜100の整数スコアに丸める
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// 4軸スコアから総合点を算出
///
/// 浮動小数の誤差を避けるため百分率の整数演算で四捨五入する
pub fn weighted_total(vibe: u8, hygiene: u8, contents: u8, season: u8) -> u8 {
    let weighted = u32::from(vibe) * Axis::Vibe.weight_percent()
        + u32::from(hygiene) * Axis::Hygiene.weight_percent()
        + u32::from(contents) * Axis::Contents.weight_percent()
        + u32::from(season) * Axis::Season.weight_percent();
    ((weighted + 50) / 100).min(100) as u8
}

/// 評価から総合点を算出
pub fn total_for(evaluation: &Evaluation) -> u8 {
    weighted_total(
        evaluation.vibe_score,
        evaluation.hygiene_score,
        evaluation.contents_score,
        evaluation.season_score,
    )
}
