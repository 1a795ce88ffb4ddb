use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};

// ==========================================
// 公共工具：错误映射、请求体解析、阻塞调用
// ==========================================

/// 错误响应（返回给前端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

/// ApiError → HTTP 状态码
pub(super) fn status_of(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::DatabaseConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::DatabaseError(_)
        | ApiError::DatabaseTransactionError(_)
        | ApiError::ConfigError(_)
        | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        }

        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

/// 请求体解析失败统一为 INVALID_INPUT
pub(super) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::InvalidInput(format!("请求体格式错误: {}", e.body_text())))
}

/// 在阻塞线程池执行同步 API（SQLite 调用不占用异步工作线程）
pub(super) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("任务执行失败: {}", e)))?
}
