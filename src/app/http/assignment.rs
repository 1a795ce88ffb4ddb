use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::{
    CreateAssignmentRequest, CreateTaskRequest, SetCompletedRequest, UpdateAssignmentRequest,
};
use crate::api::error::ApiResult;
use crate::app::state::AppState;
use crate::domain::assignment::Assignment;
use crate::domain::task::Task;
use crate::domain::types::AssignmentId;

use super::common::{body, run_blocking};

// ==========================================
// 作业相关路由
// ==========================================

/// GET /api/assignments
pub async fn list_assignments(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Assignment>>> {
    let api = state.assignment_api.clone();
    run_blocking(move || api.list()).await.map(Json)
}

/// POST /api/assignments
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let request = body(payload)?;
    let api = state.assignment_api.clone();
    let assignment = run_blocking(move || api.create(request)).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /api/assignments/{id}
pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
) -> ApiResult<Json<Assignment>> {
    let api = state.assignment_api.clone();
    run_blocking(move || api.get(id)).await.map(Json)
}

/// PUT /api/assignments/{id}
pub async fn update_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
    payload: Result<Json<UpdateAssignmentRequest>, JsonRejection>,
) -> ApiResult<Json<Assignment>> {
    let request = body(payload)?;
    let api = state.assignment_api.clone();
    run_blocking(move || api.update(id, request)).await.map(Json)
}

/// DELETE /api/assignments/{id}
pub async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
) -> ApiResult<StatusCode> {
    let api = state.assignment_api.clone();
    run_blocking(move || api.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/assignments/{id}/complete
pub async fn complete_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
    payload: Result<Json<SetCompletedRequest>, JsonRejection>,
) -> ApiResult<Json<Assignment>> {
    let request = body(payload)?;
    let api = state.assignment_api.clone();
    run_blocking(move || api.set_completed(id, request.completed))
        .await
        .map(Json)
}

/// GET /api/assignments/{id}/tasks
pub async fn list_assignment_tasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
) -> ApiResult<Json<Vec<Task>>> {
    let api = state.task_api.clone();
    run_blocking(move || api.list_by_assignment(id)).await.map(Json)
}

/// POST /api/assignments/{id}/tasks
pub async fn create_assignment_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AssignmentId>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let request = body(payload)?;
    let api = state.task_api.clone();
    let task = run_blocking(move || api.create(id, request)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}
