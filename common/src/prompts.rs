//! プロンプト生成モジュール
//!
//! 画像は `input_file_<n>` の位置参照名で列挙し、
//! モデルにはこの名前でベストフォトを返させる。

use crate::ranking::positional_label;
use crate::types::SiteMeta;

/// 診断プロンプト生成
///
/// # Arguments
/// * `site` - キャンプ場名・住所・タグ
/// * `image_count` - 添付画像の枚数（添付順に input_file_1.. と対応）
pub fn build_analysis_prompt(site: &SiteMeta, image_count: usize) -> String {
    let photo_list = (0..image_count)
        .map(|i| format!("- {} ({}번째 첨부 이미지)", positional_label(i), i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let name = if site.camping_name.is_empty() { "미입력" } else { site.camping_name.as_str() };
    let address = if site.address.is_empty() { "미입력" } else { site.address.as_str() };

    format!(
        r#"당신은 캠핑장 마케팅 전문가입니다. 첨부된 캠핑장 사진들을 종합적으로 분석해 성장 리포트를 작성하세요.

## 캠핑장 정보
- 이름: {name}
- 주소: {address}
- 레저: {leisure}
- 시설: {facility}
- 체험: {activity}

## 평가 항목 (각 0-100 정수)
1. vibe: 시각적 매력, 감성
2. hygiene: 청결, 관리 상태
3. contents: 부대시설, 콘텐츠 가치
4. season: 계절감, 시기별 마케팅 효율

## 출력 형식 (반드시 이 JSON 객체만 출력)
{{
  "evaluation": {{
    "vibe": "한 문장 평가", "vibe_score": 0,
    "hygiene": "한 문장 평가", "hygiene_score": 0,
    "contents": "한 문장 평가", "contents_score": 0,
    "season": "한 문장 평가", "season_score": 0
  }},
  "ranking": [
    {{ "rank": 1, "filename": "input_file_N", "category": "Main|Facility|Activity|Season", "reason": "선정 이유" }}
  ],
  "marketing_comment": "마케팅 개선 제안",
  "upsell_needed": true,
  "description": "캠핑장 소개글",
  "one_line_intro": "한 줄 소개"
}}

## 주의
- ranking은 최대 3개, filename은 아래 목록의 이름만 사용
- 보이는 것만 평가하고 추측하지 말 것
- JSON 외의 설명문은 출력하지 말 것

첨부 사진:
{photo_list}"#,
        leisure = join_or_dash(&site.tags.leisure),
        facility = join_or_dash(&site.tags.facility),
        activity = join_or_dash(&site.tags.activity),
    )
}

fn join_or_dash(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}
