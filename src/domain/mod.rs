// ==========================================
// 学生作业规划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、读模型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod schedule;
pub mod task;
pub mod types;

// 重导出核心类型
pub use assignment::{Assignment, AssignmentPatch, NewAssignment};
pub use schedule::{NewScheduleItem, ScheduleItem, ScheduleItemExpanded, ScheduleItemPatch};
pub use task::{NewTask, Task, TaskPatch, TaskWithContext};
pub use types::{AssignmentId, Priority, ScheduleItemId, TaskId};
