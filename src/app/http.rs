// ==========================================
// 学生作业规划系统 - HTTP 路由（按域拆分）
// ==========================================
// 职责: JSON 路由定义,连接前端与后端 API
// 约定: 错误响应体 { code, message, details }
// ==========================================

mod assignment;
mod common;
mod schedule;
mod task;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::app::state::AppState;

pub use common::ErrorResponse;
pub use schedule::HealthResponse;

/// 构建完整路由
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(schedule::health))
        // 日程
        .route("/api/schedule/generate", post(schedule::generate_schedule))
        .route("/api/schedule/day/{date}", get(schedule::get_schedule_day))
        .route("/api/schedule/items/{id}", patch(schedule::update_schedule_item))
        // 作业
        .route(
            "/api/assignments",
            get(assignment::list_assignments).post(assignment::create_assignment),
        )
        .route(
            "/api/assignments/{id}",
            get(assignment::get_assignment)
                .put(assignment::update_assignment)
                .delete(assignment::delete_assignment),
        )
        .route(
            "/api/assignments/{id}/complete",
            post(assignment::complete_assignment),
        )
        .route(
            "/api/assignments/{id}/tasks",
            get(assignment::list_assignment_tasks).post(assignment::create_assignment_task),
        )
        // 任务
        .route("/api/tasks/swap", post(task::swap_tasks))
        .route(
            "/api/tasks/{id}",
            get(task::get_task)
                .put(task::update_task)
                .delete(task::delete_task),
        )
        .route("/api/tasks/{id}/complete", post(task::complete_task))
        .route("/api/tasks/{id}/time", post(task::record_task_time))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
