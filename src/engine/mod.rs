// ==========================================
// 学生作业规划系统 - 引擎层
// ==========================================
// 主流程: TaskSelector → PrioritySorter → SchedulePacker → 落库 → ScheduleAccessor
// ==========================================
// 职责: 实现规划规则, 不拼 SQL
// 红线: 装箱引擎为纯计算, 不访问仓储
// ==========================================

pub mod accessor;
pub mod orchestrator;
pub mod packer;
pub mod policy;
pub mod priority;
pub mod repositories;
pub mod selector;
pub mod urgency;

// 重导出核心引擎
pub use accessor::ScheduleAccessor;
pub use orchestrator::{ScheduleError, ScheduleOrchestrator, ScheduleReport, ScheduleRequest};
pub use packer::{PackError, PackResult, PlacedBlock, SchedulePacker, UnscheduledTask, UnscheduledTaskDetail};
pub use policy::{LunchBreak, MicroBreak, SchedulePolicy};
pub use priority::{OrderedCandidates, PrioritySorter};
pub use repositories::ScheduleRepositories;
pub use selector::TaskSelector;
pub use urgency::UrgencyEngine;
