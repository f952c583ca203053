//! Camp Report Common Library
//!
//! サーバーとCLIで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod scoring;
pub mod ranking;
pub mod parser;
pub mod prompts;
pub mod record;
pub mod share;
pub mod dashboard;
pub mod mock;

pub use types::{
    AnalysisReport, Axis, Evaluation, LeadAction, PhotoCategory, PhotoRanking, SiteMeta, SiteTags,
};
pub use error::{Error, Result};
pub use scoring::{clamp_score, weighted_total};
pub use ranking::{parse_positional_index, positional_label, resolve_positional};
pub use parser::{extract_json_object, parse_json_object, parse_report, strip_code_fences, validate_report};
pub use prompts::build_analysis_prompt;
pub use record::{from_record_fields, to_record_fields};
pub use share::{decode_report, encode_report};
pub use dashboard::{estimated_clicks, is_high_quality, metric_summaries, percentile, MetricSummary, Trend};
pub use mock::mock_report;
