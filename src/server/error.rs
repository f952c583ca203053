use crate::error::ReportError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use camp_report_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;

/// HTTPレスポンスに変換されるエラー
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} が設定されていません")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Report(ReportError::Store(err))
    }
}

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError::Report(ReportError::Common(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Report(err) => report_status(err),
        }
    }
}

fn report_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::NoImages | ReportError::ImageLoad(_) | ReportError::FolderNotFound(_) => {
            StatusCode::BAD_REQUEST
        }
        ReportError::ImageFetch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ReportError::ModelExhausted(_) => StatusCode::BAD_GATEWAY,
        ReportError::Common(CommonError::Parse { .. } | CommonError::Validation(_)) => {
            StatusCode::BAD_GATEWAY
        }
        ReportError::Common(CommonError::Decode(_)) => StatusCode::BAD_REQUEST,
        ReportError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        ReportError::Store(StoreError::NotConfigured)
        | ReportError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
