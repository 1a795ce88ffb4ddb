// ==========================================
// 学生作业规划系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合规划引擎所需的三类 Repository
// 说明: 以 trait 对象持有, SQLite 与内存后端可互换
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    AssignmentRepository, AssignmentRepositoryImpl, MemoryStore, ScheduleItemRepository,
    ScheduleItemRepositoryImpl, TaskRepository, TaskRepositoryImpl,
};

/// 规划引擎仓储集合
///
/// # 包含的仓储
/// - `assignment_repo`: 作业
/// - `task_repo`: 任务
/// - `schedule_item_repo`: 日程项
#[derive(Clone)]
pub struct ScheduleRepositories {
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub schedule_item_repo: Arc<dyn ScheduleItemRepository>,
}

impl ScheduleRepositories {
    /// 创建新的仓储集合
    pub fn new(
        assignment_repo: Arc<dyn AssignmentRepository>,
        task_repo: Arc<dyn TaskRepository>,
        schedule_item_repo: Arc<dyn ScheduleItemRepository>,
    ) -> Self {
        Self {
            assignment_repo,
            task_repo,
            schedule_item_repo,
        }
    }

    /// 共享同一个连接的 SQLite 仓储
    pub fn sqlite(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            assignment_repo: Arc::new(AssignmentRepositoryImpl::new(conn.clone())),
            task_repo: Arc::new(TaskRepositoryImpl::new(conn.clone())),
            schedule_item_repo: Arc::new(ScheduleItemRepositoryImpl::new(conn)),
        }
    }

    /// 共享同一个 MemoryStore 的内存仓储
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            assignment_repo: store.clone(),
            task_repo: store.clone(),
            schedule_item_repo: store,
        }
    }
}
