// ==========================================
// 学生作业规划系统 - 应用层
// ==========================================
// 职责: HTTP 集成,连接前端与后端
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::{build_router, ErrorResponse};
pub use state::AppState;
