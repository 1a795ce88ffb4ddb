use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::{RecordTimeRequest, SetCompletedRequest, SwapTasksRequest, UpdateTaskRequest};
use crate::api::error::ApiResult;
use crate::app::state::AppState;
use crate::domain::task::Task;
use crate::domain::types::TaskId;

use super::common::{body, run_blocking};

// ==========================================
// 任务相关路由
// ==========================================

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    let api = state.task_api.clone();
    run_blocking(move || api.get(id)).await.map(Json)
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let request = body(payload)?;
    let api = state.task_api.clone();
    run_blocking(move || api.update(id, request)).await.map(Json)
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    let api = state.task_api.clone();
    run_blocking(move || api.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/{id}/complete
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    payload: Result<Json<SetCompletedRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let request = body(payload)?;
    let api = state.task_api.clone();
    run_blocking(move || api.set_completed(id, request.completed))
        .await
        .map(Json)
}

/// POST /api/tasks/{id}/time
pub async fn record_task_time(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
    payload: Result<Json<RecordTimeRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let request = body(payload)?;
    let api = state.task_api.clone();
    run_blocking(move || api.record_time_spent(id, request.minutes))
        .await
        .map(Json)
}

/// POST /api/tasks/swap
pub async fn swap_tasks(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SwapTasksRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let request = body(payload)?;
    let api = state.task_api.clone();
    run_blocking(move || api.swap_order(request.first_task_id, request.second_task_id))
        .await
        .map(Json)
}
