//! APIキー未設定時に返す固定レポート

use crate::scoring::total_for;
use crate::types::{AnalysisReport, Evaluation, PhotoCategory, PhotoRanking};

/// 固定のモックレポート（`mock: true`）
pub fn mock_report() -> AnalysisReport {
    let evaluation = Evaluation {
        vibe: "노을이 질 때의 텐트 풍경이 매우 감성적입니다.".to_string(),
        hygiene: "개수대 주변 정돈 상태가 아쉽습니다.".to_string(),
        contents: "불멍 구역과 아이들 놀이 시설이 잘 갖춰져 있습니다.".to_string(),
        season: "가을 단풍이 잘 드러나지만, 겨울 이미지가 부족합니다.".to_string(),
        vibe_score: 92,
        hygiene_score: 78,
        contents_score: 88,
        season_score: 80,
    };

    AnalysisReport {
        total_score: total_for(&evaluation),
        evaluation,
        ranking: vec![
            PhotoRanking {
                rank: 1,
                filename: "input_file_1".to_string(),
                category: PhotoCategory::Main,
                reason: "압도적인 자연광과 텐트의 조화".to_string(),
                image_url: None,
            },
            PhotoRanking {
                rank: 2,
                filename: "input_file_2".to_string(),
                category: PhotoCategory::Activity,
                reason: "가족 단위 활동성이 잘 드러남".to_string(),
                image_url: None,
            },
            PhotoRanking {
                rank: 3,
                filename: "input_file_3".to_string(),
                category: PhotoCategory::Facility,
                reason: "깔끔한 시설 전경".to_string(),
                image_url: None,
            },
        ],
        marketing_comment: "API 키가 설정되지 않아 예시 리포트를 표시합니다.".to_string(),
        upsell_needed: false,
        description: "예시 데이터입니다.".to_string(),
        one_line_intro: "노을이 아름다운 감성 캠핑장".to_string(),
        mock: true,
        ..Default::default()
    }
}
