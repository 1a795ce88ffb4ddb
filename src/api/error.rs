// ==========================================
// 学生作业规划系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 分类: 输入校验 / 资源未找到 / 存储失败; 预算不足不是错误
// ==========================================

use crate::engine::orchestrator::ScheduleError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 机器可读的错误码（HTTP 响应体 code 字段）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 引用错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::OrderConflict(msg) => {
                ApiError::DatabaseError(format!("任务顺序冲突: {}", msg))
            }

            // 存储错误
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("存储锁获取失败: {}", msg))
            }
            RepositoryError::TransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::QueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::CorruptRow { column, message } => {
                ApiError::InternalError(format!("库内数据损坏(列 {}): {}", column, message))
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
        }
    }
}

// 装箱失败来自超范围的任务时间, 视为输入问题
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Repository(e) => e.into(),
            ScheduleError::Pack(e) => ApiError::InvalidInput(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: ApiError = RepositoryError::not_found("Task", 7).into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg.contains("Task(id=7)")));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_repository_validation_maps_to_invalid_input() {
        let err: ApiError = RepositoryError::ValidationError("bad".to_string()).into();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_pack_error_maps_to_invalid_input() {
        let start = chrono::NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let err: ApiError = ScheduleError::Pack(crate::engine::packer::PackError::TimeOutOfRange {
            task_id: 3,
            start,
            minutes: i64::MAX,
        })
        .into();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_lock_error_maps_to_connection_error() {
        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
    }
}
