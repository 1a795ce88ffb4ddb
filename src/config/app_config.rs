// ==========================================
// 学生作业规划系统 - 进程级配置
// ==========================================
// 来源: 环境变量
// - PLANNER_DB_PATH: 数据库路径
// - PLANNER_BIND: 监听地址
// - PLANNER_STORAGE: sqlite | memory
// - PLANNER_LOG_FORMAT: text | json
// ==========================================

use std::path::PathBuf;
use std::str::FromStr;

/// 默认监听地址
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("未知存储后端: {}", other)),
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("未知日志格式: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind: String,
    pub storage: StorageBackend,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// 从环境变量读取
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（空值视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            db_path: get("PLANNER_DB_PATH").unwrap_or_else(default_db_path),
            bind: get("PLANNER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            storage: get("PLANNER_STORAGE")
                .map(|v| v.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or(StorageBackend::Sqlite),
            log_format: get("PLANNER_LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(LogFormat::Text),
        })
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 用户数据目录/study-planner/planner.db
/// - 取不到数据目录时退回 ./planner.db
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./planner.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("study-planner");
        // 目录创建失败时由打开数据库报错
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("planner.db");
    }

    path.to_string_lossy().to_string()
}
