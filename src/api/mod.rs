// ==========================================
// 学生作业规划系统 - API 层
// ==========================================
// 职责: 提供与传输无关的业务 API, 供 HTTP 路由调用
// 红线: 输入校验在任何写入之前完成
// ==========================================

pub mod assignment_api;
pub mod dto;
pub mod error;
pub mod schedule_api;
pub mod task_api;

// 重导出核心类型
pub use assignment_api::AssignmentApi;
pub use dto::{
    CreateAssignmentRequest, CreateTaskRequest, GenerateScheduleRequest, RecordTimeRequest,
    SetCompletedRequest, SwapTasksRequest, UpdateAssignmentRequest, UpdateScheduleItemRequest,
    UpdateTaskRequest,
};
pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
pub use task_api::TaskApi;
