use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use super::types::ErrorBody;

/// API错误类型
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Missing query parameter")]
    MissingQuery,

    #[error("No matching images found")]
    NotFound,

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingQuery => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!("请求处理失败: {:#}", e);
        }
        let body = ErrorBody { error: self.to_string() };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
