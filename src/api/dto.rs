// ==========================================
// 学生作业规划系统 - API 请求对象
// ==========================================
// 约定: JSON 字段 camelCase; 时间以字符串传入, 在此统一解析
// ==========================================

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{AssignmentId, Priority, TaskId};

// ==========================================
// 日程
// ==========================================

/// 生成日程请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleRequest {
    pub assignment_ids: Vec<AssignmentId>,
    /// YYYY-MM-DD / YYYY-MM-DDTHH:MM[:SS] / RFC 3339
    pub start_date: String,
    #[serde(default)]
    pub available_minutes: Option<i64>,
    /// 默认 true
    #[serde(default)]
    pub prioritize_todays_due: Option<bool>,
    /// "HH:MM", 覆盖 start_date 中的时刻
    #[serde(default)]
    pub start_time: Option<String>,
}

/// 日程项更新请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleItemRequest {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

// ==========================================
// 作业
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub course: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 只给日期时截止到当天 23:59:59
    pub due_date: String,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

// ==========================================
// 任务
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub description: String,
    pub time_allocation: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_allocation: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCompletedRequest {
    pub completed: bool,
}

/// 记录用时（分钟, 可为负用于修正）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTimeRequest {
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTasksRequest {
    pub first_task_id: TaskId,
    pub second_task_id: TaskId,
}

// ==========================================
// 时间解析
// ==========================================

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 解析日期, 可带时刻
///
/// # 返回
/// - (日期, Some(时刻)): 输入带时刻（RFC 3339 转换为本地时间）
/// - (日期, None): 纯日期
pub fn parse_date_time(raw: &str) -> ApiResult<(NaiveDate, Option<NaiveTime>)> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok((date, None));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        let local = dt.with_timezone(&Local).naive_local();
        return Ok((local.date(), Some(local.time())));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| (dt.date(), Some(dt.time())))
        .ok_or_else(|| ApiError::InvalidInput(format!("日期格式无效: {}", raw)))
}

/// 解析完整时间; 纯日期时使用 `date_only_time`
pub fn parse_datetime(raw: &str, date_only_time: NaiveTime) -> ApiResult<NaiveDateTime> {
    let (date, time) = parse_date_time(raw)?;
    Ok(date.and_time(time.unwrap_or(date_only_time)))
}

/// 解析 "HH:MM"（也接受 "HH:MM:SS"）
pub fn parse_clock(raw: &str) -> ApiResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ApiError::InvalidInput(format!("时刻格式无效(应为 HH:MM): {}", raw)))
}

/// 截止日期只给日期时的默认时刻
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
