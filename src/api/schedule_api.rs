// ==========================================
// 学生作业规划系统 - 日程 API
// ==========================================
// 对外三个调用: generate / get_day / update_item
// 并发: 同一天的生成请求串行执行（按日期加写锁）
// 生成过程是同步库操作, 在阻塞线程池上执行, 不占用异步工作线程
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, instrument};

use crate::api::dto::{parse_clock, parse_date_time, GenerateScheduleRequest, UpdateScheduleItemRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::config::policy_reader::SchedulePolicyReader;
use crate::domain::schedule::{ScheduleItem, ScheduleItemExpanded, ScheduleItemPatch};
use crate::domain::types::ScheduleItemId;
use crate::engine::accessor::ScheduleAccessor;
use crate::engine::orchestrator::{ScheduleOrchestrator, ScheduleReport, ScheduleRequest};
use crate::engine::policy::SchedulePolicy;
use crate::engine::repositories::ScheduleRepositories;

// ==========================================
// ScheduleApi - 日程 API
// ==========================================
pub struct ScheduleApi {
    repos: ScheduleRepositories,
    orchestrator: Arc<ScheduleOrchestrator>,
    accessor: ScheduleAccessor,
    policy_reader: Arc<dyn SchedulePolicyReader>,
    day_locks: Mutex<HashMap<NaiveDate, Arc<tokio::sync::Mutex<()>>>>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - policy_reader: 日程策略来源
    pub fn new(repos: ScheduleRepositories, policy_reader: Arc<dyn SchedulePolicyReader>) -> Self {
        Self {
            orchestrator: Arc::new(ScheduleOrchestrator::new(repos.clone())),
            accessor: ScheduleAccessor::new(repos.clone()),
            repos,
            policy_reader,
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 生成日程并覆盖目标日旧日程
    ///
    /// # 返回
    /// - Err(InvalidInput): 作业列表为空、日期/时刻格式无效、可用分钟为负
    /// - Ok(ScheduleReport): 预算不足的任务在 not_scheduled 中, 不是错误
    #[instrument(skip(self, request), fields(start_date = %request.start_date))]
    pub async fn generate(&self, request: GenerateScheduleRequest) -> ApiResult<ScheduleReport> {
        // 1. 输入校验（无副作用）
        if request.assignment_ids.is_empty() {
            return Err(ApiError::InvalidInput("assignmentIds 不能为空".to_string()));
        }
        if let Some(minutes) = request.available_minutes {
            if minutes < 0 {
                return Err(ApiError::InvalidInput(format!(
                    "availableMinutes 不能为负: {}",
                    minutes
                )));
            }
        }

        let policy = self
            .policy_reader
            .get_schedule_policy()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let start = resolve_start(&request, &policy)?;

        let schedule_request = ScheduleRequest {
            assignment_ids: request.assignment_ids,
            start,
            available_minutes: request.available_minutes,
            prioritize_todays_due: request.prioritize_todays_due.unwrap_or(true),
        };

        // 2. 同一天串行
        let day_lock = self.day_lock(start.date())?;
        let _guard = day_lock.lock().await;

        let orchestrator = Arc::clone(&self.orchestrator);
        let report = tokio::task::spawn_blocking(move || {
            orchestrator.generate(&schedule_request, &policy)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("日程生成任务执行失败: {}", e)))??;
        info!(
            day = %start.date(),
            scheduled = report.schedule_items.len(),
            not_scheduled = report.not_scheduled.len(),
            "日程已生成"
        );
        Ok(report)
    }

    /// 查询某天日程（展开任务与作业）
    pub fn get_day(&self, date: &str) -> ApiResult<Vec<ScheduleItemExpanded>> {
        let (day, _) = parse_date_time(date)?;
        Ok(self.accessor.get_schedule_for_day(day)?)
    }

    /// 更新日程项（完成标志/起止时间）
    pub fn update_item(
        &self,
        id: ScheduleItemId,
        request: UpdateScheduleItemRequest,
    ) -> ApiResult<ScheduleItem> {
        let mut item = self
            .repos
            .schedule_item_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("日程项(id={})不存在", id)))?;

        let patch = ScheduleItemPatch {
            completed: request.completed,
            start_time: request
                .start_time
                .as_deref()
                .map(|raw| parse_item_time(raw, item.start_time))
                .transpose()?,
            end_time: request
                .end_time
                .as_deref()
                .map(|raw| parse_item_time(raw, item.end_time))
                .transpose()?,
        };
        patch.apply(&mut item);

        if item.start_time >= item.end_time {
            return Err(ApiError::InvalidInput(format!(
                "开始时间必须早于结束时间: {} >= {}",
                item.start_time, item.end_time
            )));
        }

        self.repos.schedule_item_repo.update(&item)?;
        Ok(item)
    }

    fn day_lock(&self, day: NaiveDate) -> ApiResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .day_locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("日程锁获取失败: {}", e)))?;
        Ok(locks.entry(day).or_default().clone())
    }
}

/// 起始游标: startTime > startDate 中的时刻 > 策略开工时刻
fn resolve_start(
    request: &GenerateScheduleRequest,
    policy: &SchedulePolicy,
) -> ApiResult<NaiveDateTime> {
    let (date, time_in_date) = parse_date_time(&request.start_date)?;
    let start = match request.start_time.as_deref() {
        Some(clock) => date.and_time(parse_clock(clock)?),
        None => match time_in_date {
            Some(time) => date.and_time(time),
            None => policy.day_start_on(date),
        },
    };
    Ok(start)
}

/// 日程项时间: 完整时间, 或只给 "HH:MM" 时沿用原日期
fn parse_item_time(raw: &str, current: NaiveDateTime) -> ApiResult<NaiveDateTime> {
    if let Ok(clock) = parse_clock(raw) {
        return Ok(current.date().and_time(clock));
    }
    match parse_date_time(raw)? {
        (date, Some(time)) => Ok(date.and_time(time)),
        (_, None) => Err(ApiError::InvalidInput(format!("缺少时刻: {}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::policy_reader::StaticPolicyReader;
    use chrono::NaiveTime;

    fn request(start_date: &str, start_time: Option<&str>) -> GenerateScheduleRequest {
        GenerateScheduleRequest {
            assignment_ids: vec![1],
            start_date: start_date.to_string(),
            available_minutes: None,
            prioritize_todays_due: None,
            start_time: start_time.map(str::to_string),
        }
    }

    fn api() -> ScheduleApi {
        ScheduleApi::new(
            ScheduleRepositories::in_memory(),
            Arc::new(StaticPolicyReader::new(SchedulePolicy::without_breaks())),
        )
    }

    #[test]
    fn test_resolve_start_precedence() {
        let policy = SchedulePolicy::default();

        let start = resolve_start(&request("2026-03-02", None), &policy).unwrap();
        assert_eq!(start.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let start = resolve_start(&request("2026-03-02T14:00", None), &policy).unwrap();
        assert_eq!(start.time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());

        let start = resolve_start(&request("2026-03-02T14:00", Some("10:30")), &policy).unwrap();
        assert_eq!(start.time(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn test_generate_validates_input() {
        let api = api();

        let mut empty = request("2026-03-02", None);
        empty.assignment_ids.clear();
        assert!(matches!(api.generate(empty).await, Err(ApiError::InvalidInput(_))));

        let mut negative = request("2026-03-02", None);
        negative.available_minutes = Some(-1);
        assert!(matches!(api.generate(negative).await, Err(ApiError::InvalidInput(_))));

        assert!(matches!(
            api.generate(request("yesterday", None)).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_with_unknown_assignments_is_empty() {
        let report = api().generate(request("2026-03-02", None)).await.unwrap();
        assert!(report.schedule_items.is_empty());
        assert!(report.not_scheduled.is_empty());
        assert_eq!(report.total_tasks_time, 0);
    }

    #[tokio::test]
    async fn test_generate_persists_on_current_thread_runtime() {
        use crate::domain::assignment::NewAssignment;
        use crate::domain::task::NewTask;
        use crate::domain::types::Priority;

        let repos = ScheduleRepositories::in_memory();
        let essay = repos
            .assignment_repo
            .create(NewAssignment {
                title: "Essay".to_string(),
                course: "ENG".to_string(),
                description: None,
                due_date: NaiveDate::from_ymd_opt(2026, 3, 4)
                    .unwrap()
                    .and_hms_opt(23, 59, 0)
                    .unwrap(),
                priority: Priority::High,
            })
            .unwrap();
        for minutes in [30, 45] {
            repos
                .task_repo
                .create(NewTask {
                    assignment_id: essay.id,
                    description: format!("{} min", minutes),
                    time_allocation: minutes,
                })
                .unwrap();
        }
        let api = ScheduleApi::new(
            repos.clone(),
            Arc::new(StaticPolicyReader::new(SchedulePolicy::without_breaks())),
        );

        let mut req = request("2026-03-02", Some("09:00"));
        req.assignment_ids = vec![essay.id];
        let report = api.generate(req).await.unwrap();

        assert_eq!(report.schedule_items.len(), 2);
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let stored = repos.schedule_item_repo.list_by_day(day).unwrap();
        assert!(stored.iter().all(|item| item.run_id == report.run_id));
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_update_missing_item_is_not_found() {
        assert!(matches!(
            api().update_item(1, UpdateScheduleItemRequest::default()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_item_time_keeps_date_for_clock() {
        let current = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(
            parse_item_time("10:15", current).unwrap(),
            current.date().and_hms_opt(10, 15, 0).unwrap()
        );
        assert!(parse_item_time("2026-03-03", current).is_err());
    }
}
