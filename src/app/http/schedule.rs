use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::dto::{GenerateScheduleRequest, UpdateScheduleItemRequest};
use crate::api::error::ApiResult;
use crate::app::state::AppState;
use crate::domain::schedule::{ScheduleItem, ScheduleItemExpanded};
use crate::domain::types::ScheduleItemId;
use crate::engine::orchestrator::ScheduleReport;

use super::common::{body, run_blocking};

// ==========================================
// 日程相关路由
// ==========================================

/// POST /api/schedule/generate
pub async fn generate_schedule(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateScheduleRequest>, JsonRejection>,
) -> ApiResult<Json<ScheduleReport>> {
    let request = body(payload)?;
    state.schedule_api.generate(request).await.map(Json)
}

/// GET /api/schedule/day/{date}
pub async fn get_schedule_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<ScheduleItemExpanded>>> {
    let api = state.schedule_api.clone();
    run_blocking(move || api.get_day(&date)).await.map(Json)
}

/// PATCH /api/schedule/items/{id}
pub async fn update_schedule_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ScheduleItemId>,
    payload: Result<Json<UpdateScheduleItemRequest>, JsonRejection>,
) -> ApiResult<Json<ScheduleItem>> {
    let request = body(payload)?;
    let api = state.schedule_api.clone();
    run_blocking(move || api.update_item(id, request)).await.map(Json)
}

// ==========================================
// 健康检查
// ==========================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        storage: match state.storage {
            crate::config::StorageBackend::Sqlite => "sqlite",
            crate::config::StorageBackend::Memory => "memory",
        },
    })
}
