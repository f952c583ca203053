//! キャンプ場写真のAI診断

mod images;

pub use images::{detect_mime, fetch_all, HttpImageFetcher, ImageFetcher};

use crate::error::{ReportError, Result};
use crate::gemini::{generate_with_fallback, GenerativeModel, InlineImage};
use camp_report_common::{build_analysis_prompt, mock_report, parse_report, resolve_positional};
use camp_report_common::{AnalysisReport, SiteMeta};
use std::sync::Arc;

/// 診断対象の画像
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 取得してからモデルへ送る
    Url(String),
    /// 圧縮済みのバイト列
    Inline(InlineImage),
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub site: SiteMeta,
    pub images: Vec<ImageSource>,
}

pub struct Analyzer {
    /// APIキー未設定なら None（モックを返す）
    model: Option<Arc<dyn GenerativeModel>>,
    fetcher: Arc<dyn ImageFetcher>,
    candidates: Vec<String>,
}

impl Analyzer {
    pub fn new(
        model: Option<Arc<dyn GenerativeModel>>,
        fetcher: Arc<dyn ImageFetcher>,
        candidates: Vec<String>,
    ) -> Self {
        Self {
            model,
            fetcher,
            candidates,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.model.is_none()
    }

    /// 画像群を診断してレポートを返す
    ///
    /// 画像0枚はネットワークに触れる前に拒否する。
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        if request.images.is_empty() {
            return Err(ReportError::NoImages);
        }
        let photo_count = request.images.len();

        let Some(model) = &self.model else {
            tracing::warn!("model API key not configured, returning mock report");
            return Ok(mock_report().with_site(&request.site, photo_count));
        };

        let images = self.resolve_images(&request.images).await?;
        let prompt = build_analysis_prompt(&request.site, images.len());

        let reply = generate_with_fallback(model.as_ref(), &self.candidates, &prompt, &images).await?;
        tracing::info!(model = reply.model.as_str(), chars = reply.text.len(), "model replied");

        let mut report = parse_report(&reply.text)?.with_site(&request.site, photo_count);
        attach_image_urls(&mut report, &request.images);

        tracing::info!(
            camping_name = report.camping_name.as_str(),
            total_score = report.total_score,
            "analysis complete"
        );
        Ok(report)
    }

    /// URLは並行取得し、入力順のまま並べる
    async fn resolve_images(&self, sources: &[ImageSource]) -> Result<Vec<InlineImage>> {
        let urls: Vec<String> = sources
            .iter()
            .filter_map(|s| match s {
                ImageSource::Url(url) => Some(url.clone()),
                ImageSource::Inline(_) => None,
            })
            .collect();
        let mut fetched = fetch_all(self.fetcher.as_ref(), &urls).await?.into_iter();

        let mut images = Vec::with_capacity(sources.len());
        for source in sources {
            match source {
                ImageSource::Inline(image) => images.push(image.clone()),
                ImageSource::Url(url) => {
                    let image = fetched.next().ok_or_else(|| ReportError::ImageFetch {
                        url: url.clone(),
                        reason: "missing fetch result".to_string(),
                    })?;
                    images.push(image);
                }
            }
        }
        Ok(images)
    }
}

/// `input_file_<n>` を元のURLに解決（範囲外・インライン画像は未解決のまま）
pub fn attach_image_urls(report: &mut AnalysisReport, sources: &[ImageSource]) {
    for entry in &mut report.ranking {
        entry.image_url = match resolve_positional(&entry.filename, sources) {
            Some(ImageSource::Url(url)) => Some(url.clone()),
            _ => None,
        };
    }
}
