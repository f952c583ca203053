//! 共有リンク用トークン
//!
//! レポートJSONをURLセーフなBase64（パディングなし）にエンコードする。
//! 旧形式（パーセントエンコードしたJSONを標準Base64化したもの）も読み込める。

use crate::error::{Error, Result};
use crate::types::AnalysisReport;
use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};

/// レポートを共有トークンに変換
pub fn encode_report(report: &AnalysisReport) -> Result<String> {
    let json = serde_json::to_vec(report)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// 共有トークンからレポートを復元
pub fn decode_report(token: &str) -> Result<AnalysisReport> {
    let token = token.trim().trim_end_matches('=');
    decode_current(token).or_else(|err| decode_legacy(token).map_err(|_| err))
}

fn decode_current(token: &str) -> Result<AnalysisReport> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| Error::Decode(format!("invalid share token: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Decode(format!("invalid report payload: {}", e)))
}

/// 旧形式: base64(percent-encode(json))
fn decode_legacy(token: &str) -> Result<AnalysisReport> {
    let bytes = STANDARD_NO_PAD
        .decode(token)
        .map_err(|e| Error::Decode(format!("invalid legacy token: {}", e)))?;
    let encoded = String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    let json = urlencoding::decode(&encoded).map_err(|e| Error::Decode(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| Error::Decode(format!("invalid report payload: {}", e)))
}
