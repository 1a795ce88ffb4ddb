// ==========================================
// 学生作业规划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽存储细节
// 后端: SQLite（*RepositoryImpl）与内存（MemoryStore）可互换
// ==========================================

pub mod assignment_repo;
pub mod error;
pub mod memory_store;
pub mod schedule_item_repo;
pub mod task_repo;

// 重导出核心仓储
pub use assignment_repo::{AssignmentRepository, AssignmentRepositoryImpl};
pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::MemoryStore;
pub use schedule_item_repo::{ScheduleItemRepository, ScheduleItemRepositoryImpl};
pub use task_repo::{TaskRepository, TaskRepositoryImpl};
