//! 診断結果の型定義
//!
//! サーバーとCLIで共有される型:
//! - SiteMeta: 解析リクエストのキャンプ場情報
//! - AnalysisReport: AI診断の最終出力
//! - LeadAction: レコードに記録する後続アクションのフラグ

use serde::{Deserialize, Serialize};

/// 評価軸（4軸固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// 視覚的魅力
    Vibe,
    /// 清潔感
    Hygiene,
    /// 設備・コンテンツ
    Contents,
    /// 季節感
    Season,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Vibe, Axis::Hygiene, Axis::Contents, Axis::Season];

    /// JSONキー（`vibe`, `vibe_score` の接頭辞）
    pub fn key(&self) -> &'static str {
        match self {
            Axis::Vibe => "vibe",
            Axis::Hygiene => "hygiene",
            Axis::Contents => "contents",
            Axis::Season => "season",
        }
    }

    /// 総合点の重み（百分率）
    pub fn weight_percent(&self) -> u32 {
        match self {
            Axis::Vibe => 35,
            Axis::Hygiene => 25,
            Axis::Contents => 25,
            Axis::Season => 15,
        }
    }

    /// ダッシュボード表示名
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Vibe => "비주얼 경쟁력",
            Axis::Hygiene => "청결 안심 지수",
            Axis::Contents => "콘텐츠 매력도",
            Axis::Season => "계절감",
        }
    }
}

/// キャンプ場のタグ（レジャー/設備/体験）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteTags {
    pub leisure: Vec<String>,
    pub facility: Vec<String>,
    pub activity: Vec<String>,
}

impl SiteTags {
    pub fn is_empty(&self) -> bool {
        self.leisure.is_empty() && self.facility.is_empty() && self.activity.is_empty()
    }
}

/// 解析リクエストのメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteMeta {
    pub camping_name: String,
    pub address: String,
    pub tags: SiteTags,
}

/// 4軸の評価コメントとスコア
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evaluation {
    pub vibe: String,
    pub hygiene: String,
    pub contents: String,
    pub season: String,
    pub vibe_score: u8,
    pub hygiene_score: u8,
    pub contents_score: u8,
    pub season_score: u8,
}

impl Evaluation {
    pub fn score(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Vibe => self.vibe_score,
            Axis::Hygiene => self.hygiene_score,
            Axis::Contents => self.contents_score,
            Axis::Season => self.season_score,
        }
    }

    pub fn comment(&self, axis: Axis) -> &str {
        match axis {
            Axis::Vibe => &self.vibe,
            Axis::Hygiene => &self.hygiene,
            Axis::Contents => &self.contents,
            Axis::Season => &self.season,
        }
    }

    pub fn set_score(&mut self, axis: Axis, score: u8) {
        match axis {
            Axis::Vibe => self.vibe_score = score,
            Axis::Hygiene => self.hygiene_score = score,
            Axis::Contents => self.contents_score = score,
            Axis::Season => self.season_score = score,
        }
    }

    pub fn set_comment(&mut self, axis: Axis, comment: String) {
        match axis {
            Axis::Vibe => self.vibe = comment,
            Axis::Hygiene => self.hygiene = comment,
            Axis::Contents => self.contents = comment,
            Axis::Season => self.season = comment,
        }
    }
}

/// ベストフォトの区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum PhotoCategory {
    #[default]
    Main,
    Facility,
    Activity,
    Season,
}

impl From<String> for PhotoCategory {
    fn from(value: String) -> Self {
        PhotoCategory::from(value.as_str())
    }
}

impl From<&str> for PhotoCategory {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "facility" => PhotoCategory::Facility,
            "activity" => PhotoCategory::Activity,
            "season" => PhotoCategory::Season,
            _ => PhotoCategory::Main,
        }
    }
}

/// ベストフォト順位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRanking {
    pub rank: u8,
    /// `input_file_<n>` 形式の位置参照
    pub filename: String,
    pub category: PhotoCategory,
    pub reason: String,
    /// 位置参照から解決した画像URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// AI診断レポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    pub total_score: u8,
    pub evaluation: Evaluation,
    pub ranking: Vec<PhotoRanking>,
    pub marketing_comment: String,
    pub upsell_needed: bool,
    pub description: String,
    pub one_line_intro: String,

    #[serde(rename = "campingName")]
    pub camping_name: String,
    pub address: String,
    pub tags: SiteTags,
    #[serde(rename = "photoCount")]
    pub photo_count: usize,

    /// APIキー未設定時の固定レスポンス
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub mock: bool,
}

impl AnalysisReport {
    /// リクエストのメタデータを付与
    pub fn with_site(mut self, site: &SiteMeta, photo_count: usize) -> Self {
        self.camping_name = site.camping_name.clone();
        self.address = site.address.clone();
        self.tags = site.tags.clone();
        self.photo_count = photo_count;
        self
    }
}

/// レコードに記録する後続アクション（真偽値フィールド）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    PhotoContest,
    Promotion,
    CancelInsurance,
    EasyCamping,
    Coupon,
    Photographer,
}

impl LeadAction {
    pub const ALL: [LeadAction; 6] = [
        LeadAction::PhotoContest,
        LeadAction::Promotion,
        LeadAction::CancelInsurance,
        LeadAction::EasyCamping,
        LeadAction::Coupon,
        LeadAction::Photographer,
    ];

    /// テーブル側のフィールド名（既存スキーマと一致させる）
    pub fn field_name(&self) -> &'static str {
        match self {
            LeadAction::PhotoContest => "사진공모전_참여",
            LeadAction::Promotion => "기획전_신청",
            LeadAction::CancelInsurance => "안심취소_신청",
            LeadAction::EasyCamping => "이지캠핑_신청",
            LeadAction::Coupon => "쿠폰 할인 긍정",
            LeadAction::Photographer => "전문가촬영_신청",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            LeadAction::PhotoContest => "photo-contest",
            LeadAction::Promotion => "promotion",
            LeadAction::CancelInsurance => "cancel-insurance",
            LeadAction::EasyCamping => "easy-camping",
            LeadAction::Coupon => "coupon",
            LeadAction::Photographer => "photographer",
        }
    }
}

impl std::str::FromStr for LeadAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LeadAction::ALL
            .iter()
            .copied()
            .find(|a| a.id() == s || a.field_name() == s)
            .ok_or_else(|| format!("Unknown lead action: {}", s))
    }
}

impl std::fmt::Display for LeadAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}
