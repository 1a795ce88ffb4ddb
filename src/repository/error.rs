// ==========================================
// 学生作业规划系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 两个后端（SQLite / 内存）共用, 调用方不区分错误来自哪个后端
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 引用错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("引用的记录不存在: {0}")]
    ForeignKeyViolation(String),

    #[error("任务顺序冲突: {0}")]
    OrderConflict(String),

    // ===== 存储错误 =====
    #[error("存储锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    TransactionError(String),

    #[error("数据库查询失败: {0}")]
    QueryError(String),

    #[error("库内数据无法解析(列 {column}): {message}")]
    CorruptRow { column: usize, message: String },

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),
}

impl RepositoryError {
    /// 构造 NotFound
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // 约束失败按 SQLite 消息前缀归类
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::OrderConflict(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK") {
                    RepositoryError::ValidationError(msg)
                } else {
                    RepositoryError::QueryError(msg)
                }
            }
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                RepositoryError::CorruptRow {
                    column,
                    message: source.to_string(),
                }
            }
            _ => RepositoryError::QueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Type;

    #[test]
    fn test_conversion_failure_is_corrupt_row() {
        let source: Box<dyn std::error::Error + Send + Sync> = "bad datetime".into();
        let err: RepositoryError =
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, source).into();
        assert!(matches!(err, RepositoryError::CorruptRow { column: 2, .. }));
    }

    #[test]
    fn test_foreign_key_failure_is_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));",
        )
        .unwrap();

        let err: RepositoryError = conn
            .execute("INSERT INTO child (parent_id) VALUES (42)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
