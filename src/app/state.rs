// ==========================================
// 学生作业规划系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 后端: sqlite（文件库 + config_kv 策略）或 memory（固定默认策略）
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AssignmentApi, ScheduleApi, TaskApi};
use crate::config::app_config::{AppConfig, StorageBackend};
use crate::config::config_manager::ConfigManager;
use crate::config::policy_reader::{SchedulePolicyReader, StaticPolicyReader};
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::engine::policy::SchedulePolicy;
use crate::engine::repositories::ScheduleRepositories;

/// 应用状态
///
/// 包含所有API实例和共享资源, 由 HTTP 路由以 `Arc<AppState>` 共享
pub struct AppState {
    /// 存储后端
    pub storage: StorageBackend,

    /// 作业API
    pub assignment_api: Arc<AssignmentApi>,

    /// 任务API
    pub task_api: Arc<TaskApi>,

    /// 日程API
    pub schedule_api: Arc<ScheduleApi>,

    /// 配置管理器（仅 sqlite 后端）
    pub config_manager: Option<Arc<ConfigManager>>,
}

impl AppState {
    /// 按进程配置创建AppState
    ///
    /// # 步骤
    /// 1. 打开数据库并建表（sqlite 后端）
    /// 2. 创建仓储与策略来源
    /// 3. 创建API实例
    pub fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::info!("使用内存存储");
                Ok(Self::in_memory(SchedulePolicy::default()))
            }
            StorageBackend::Sqlite => {
                tracing::info!(db_path = %config.db_path, "使用 SQLite 存储");
                let conn = open_sqlite_connection(&config.db_path)?;
                init_schema(&conn)?;
                let version = read_schema_version(&conn)?;
                tracing::debug!(schema_version = ?version, "数据库初始化完成");

                let conn = Arc::new(Mutex::new(conn));
                let repos = ScheduleRepositories::sqlite(conn.clone());
                let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

                Ok(Self::assemble(
                    StorageBackend::Sqlite,
                    repos,
                    config_manager.clone(),
                    Some(config_manager),
                ))
            }
        }
    }

    /// 内存后端（测试与演示）
    pub fn in_memory(policy: SchedulePolicy) -> Self {
        Self::assemble(
            StorageBackend::Memory,
            ScheduleRepositories::in_memory(),
            Arc::new(StaticPolicyReader::new(policy)),
            None,
        )
    }

    fn assemble(
        storage: StorageBackend,
        repos: ScheduleRepositories,
        policy_reader: Arc<dyn SchedulePolicyReader>,
        config_manager: Option<Arc<ConfigManager>>,
    ) -> Self {
        Self {
            storage,
            assignment_api: Arc::new(AssignmentApi::new(repos.clone())),
            task_api: Arc::new(TaskApi::new(repos.clone())),
            schedule_api: Arc::new(ScheduleApi::new(repos, policy_reader)),
            config_manager,
        }
    }
}
