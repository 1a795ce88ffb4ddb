// ==========================================
// HTTP 接口端到端测试
// ==========================================
// 路由: build_router + 内存后端, 通过 oneshot 直接驱动
// ==========================================

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use study_planner::app::{build_router, AppState};
use study_planner::engine::SchedulePolicy;
use tower::ServiceExt;

fn app() -> Router {
    build_router(Arc::new(AppState::in_memory(SchedulePolicy::without_breaks())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_assignment(app: &Router, title: &str, due_date: &str, priority: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "title": title,
            "course": "MATH 101",
            "dueDate": due_date,
            "priority": priority,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_task(app: &Router, assignment_id: i64, minutes: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/api/assignments/{}/tasks", assignment_id),
        Some(json!({ "description": format!("{} minutes", minutes), "timeAllocation": minutes })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_full_planning_flow() {
    let app = app();
    let essay = create_assignment(&app, "Essay", "2026-03-02", "low").await;
    let lab = create_assignment(&app, "Lab", "2026-03-05T17:00:00", "high").await;
    let urgent_task = create_task(&app, essay, 45).await;
    let future_task = create_task(&app, lab, 30).await;

    // 预计用时随任务创建重算
    let (_, assignment) = send(&app, Method::GET, &format!("/api/assignments/{}", essay), None).await;
    assert_eq!(assignment["estimatedTime"], 45);

    let (status, report) = send(
        &app,
        Method::POST,
        "/api/schedule/generate",
        Some(json!({
            "assignmentIds": [essay, lab],
            "startDate": "2026-03-02",
            "startTime": "09:00",
            "availableMinutes": 45,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", report);

    let items = report["scheduleItems"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["taskId"], urgent_task);
    assert_eq!(items[0]["startTime"], "2026-03-02T09:00:00");
    assert_eq!(items[0]["endTime"], "2026-03-02T09:45:00");
    assert_eq!(report["notScheduled"][0]["taskId"], future_task);
    assert_eq!(report["todaysDueTasksTime"], 45);

    // 查询当天
    let (status, day) = send(&app, Method::GET, "/api/schedule/day/2026-03-02", None).await;
    assert_eq!(status, StatusCode::OK);
    let day = day.as_array().unwrap();
    assert_eq!(day.len(), 1);
    assert_eq!(day[0]["task"]["id"], urgent_task);
    assert_eq!(day[0]["assignment"]["title"], "Essay");

    // 调整日程项
    let item_id = items[0]["id"].as_i64().unwrap();
    let (status, patched) = send(
        &app,
        Method::PATCH,
        &format!("/api/schedule/items/{}", item_id),
        Some(json!({ "startTime": "10:00", "endTime": "10:45", "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", patched);
    assert_eq!(patched["startTime"], "2026-03-02T10:00:00");
    assert_eq!(patched["completed"], true);
}

#[tokio::test]
async fn test_completing_last_task_completes_assignment() {
    let app = app();
    let essay = create_assignment(&app, "Essay", "2026-03-02", "medium").await;
    let first = create_task(&app, essay, 20).await;
    let second = create_task(&app, essay, 25).await;

    for task_id in [first, second] {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/complete", task_id),
            Some(json!({ "completed": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, assignment) = send(&app, Method::GET, &format!("/api/assignments/{}", essay), None).await;
    assert_eq!(assignment["completed"], true);
}

#[tokio::test]
async fn test_swap_tasks_reorders() {
    let app = app();
    let essay = create_assignment(&app, "Essay", "2026-03-04", "high").await;
    let first = create_task(&app, essay, 20).await;
    let second = create_task(&app, essay, 25).await;

    let (status, tasks) = send(
        &app,
        Method::POST,
        "/api/tasks/swap",
        Some(json!({ "firstTaskId": first, "secondTaskId": second })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", tasks);
    assert_eq!(tasks[0]["id"], second);
    assert_eq!(tasks[1]["id"], first);
}

#[tokio::test]
async fn test_empty_assignment_list_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/schedule/generate",
        Some(json!({ "assignmentIds": [], "startDate": "2026-03-02" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_input() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "title": "missing fields" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_bad_date_is_invalid_input() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/schedule/day/not-a-date", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/assignments/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::DELETE, "/api/tasks/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/schedule/items/404",
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_assignment_removes_it() {
    let app = app();
    let essay = create_assignment(&app, "Essay", "2026-03-02", "low").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/assignments/{}", essay), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send(&app, Method::GET, "/api/assignments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}
