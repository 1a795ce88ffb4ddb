// ==========================================
// 学生作业规划系统 - 配置层
// ==========================================
// 职责: 日程策略覆写 + 进程级配置
// 存储: config_kv 表 / 环境变量
// ==========================================

pub mod app_config;
pub mod config_manager;
pub mod policy_reader;

// 重导出核心配置
pub use app_config::{AppConfig, LogFormat, StorageBackend};
pub use config_manager::{config_keys, ConfigManager};
pub use policy_reader::{ConfigResult, SchedulePolicyReader, StaticPolicyReader};
