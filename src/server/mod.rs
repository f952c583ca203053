//! HTTP API サーバー

mod error;
mod handlers;

pub use error::ApiError;

use crate::analyzer::{Analyzer, HttpImageFetcher, ImageFetcher};
use crate::config::Config;
use crate::error::Result;
use crate::gemini::{GeminiClient, GenerativeModel};
use crate::notify::{Notifier, ResendNotifier};
use crate::storage::{CloudinaryStorage, ObjectStorage};
use crate::store::{AirtableStore, RecordStore};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 全ハンドラで共有する状態（起動後は不変）
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub store: Option<Arc<dyn RecordStore>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub storage: Option<Arc<dyn ObjectStorage>>,
    pub persist_wait: Duration,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// 設定から外部サービスのクライアントを組み立てる
    ///
    /// 未設定のサービスは None のまま起動し、該当機能だけ無効になる。
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let model: Option<Arc<dyn GenerativeModel>> = match &config.gemini_api_key {
            Some(key) if config.has_model_key() => Some(Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_base_url.clone(),
                timeout,
            )?)),
            _ => {
                tracing::warn!("GOOGLE_API_KEY not set, analysis will return mock reports");
                None
            }
        };
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::new(timeout)?);
        let analyzer = Analyzer::new(model, fetcher, config.models.clone());

        let store: Option<Arc<dyn RecordStore>> =
            match (&config.airtable_api_key, &config.airtable_base_id) {
                (Some(key), Some(base)) if config.has_store() => Some(Arc::new(AirtableStore::new(
                    key.clone(),
                    base.clone(),
                    config.airtable_table_name.clone(),
                    timeout,
                )?)),
                _ => {
                    tracing::warn!("Airtable not configured, reports will not be saved");
                    None
                }
            };

        let notifier: Option<Arc<dyn Notifier>> =
            match (&config.resend_api_key, &config.alert_email_to) {
                (Some(key), Some(to)) => Some(Arc::new(ResendNotifier::new(
                    key.clone(),
                    config.alert_email_from.clone(),
                    to.clone(),
                    timeout,
                )?)),
                _ => None,
            };

        let storage: Option<Arc<dyn ObjectStorage>> =
            match (&config.cloudinary_cloud_name, &config.cloudinary_upload_preset) {
                (Some(cloud), Some(preset)) => Some(Arc::new(CloudinaryStorage::new(
                    cloud.clone(),
                    preset.clone(),
                    timeout,
                )?)),
                _ => None,
            };

        Ok(Self {
            analyzer: Arc::new(analyzer),
            store,
            notifier,
            storage,
            persist_wait: Duration::from_secs(config.persist_wait_seconds),
            body_limit_bytes: config.body_limit_mb * 1024 * 1024,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;

    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/analyze/upload", post(handlers::analyze_upload))
        .route(
            "/api/records/update",
            post(handlers::update_record).patch(handlers::update_record),
        )
        .route("/api/records/:id", get(handlers::get_record))
        .route("/api/share/:token", get(handlers::get_shared))
        .route("/api/upload", post(handlers::upload_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = bind_addr, mock = state.analyzer.is_mock(), "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
