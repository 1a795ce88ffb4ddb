// ==========================================
// 学生作业规划系统 - 作业 API
// ==========================================
// 职责: 作业增删改查、完成状态传播
// 红线: 校验失败不产生任何写入
// ==========================================

use tracing::info;

use crate::api::dto::{end_of_day, parse_datetime, CreateAssignmentRequest, UpdateAssignmentRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::assignment::{Assignment, AssignmentPatch, NewAssignment};
use crate::domain::types::AssignmentId;
use crate::engine::repositories::ScheduleRepositories;

// ==========================================
// AssignmentApi - 作业 API
// ==========================================
pub struct AssignmentApi {
    repos: ScheduleRepositories,
}

impl AssignmentApi {
    pub fn new(repos: ScheduleRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按截止时间升序列出全部作业
    pub fn list(&self) -> ApiResult<Vec<Assignment>> {
        Ok(self.repos.assignment_repo.list_all()?)
    }

    pub fn get(&self, id: AssignmentId) -> ApiResult<Assignment> {
        self.repos
            .assignment_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("作业(id={})不存在", id)))
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 新建作业
    ///
    /// # 返回
    /// - Err(InvalidInput): 标题/课程为空或截止时间格式无效
    pub fn create(&self, request: CreateAssignmentRequest) -> ApiResult<Assignment> {
        let title = require_text("title", &request.title)?;
        let course = require_text("course", &request.course)?;
        let due_date = parse_datetime(&request.due_date, end_of_day())?;

        let assignment = self.repos.assignment_repo.create(NewAssignment {
            title,
            course,
            description: request.description,
            due_date,
            priority: request.priority.unwrap_or_default(),
        })?;

        info!(assignment_id = assignment.id, title = %assignment.title, "作业已创建");
        Ok(assignment)
    }

    /// 更新作业字段（未提供的字段不变）
    pub fn update(&self, id: AssignmentId, request: UpdateAssignmentRequest) -> ApiResult<Assignment> {
        let patch = AssignmentPatch {
            title: request.title.as_deref().map(|t| require_text("title", t)).transpose()?,
            course: request.course.as_deref().map(|c| require_text("course", c)).transpose()?,
            description: request.description,
            due_date: request
                .due_date
                .as_deref()
                .map(|d| parse_datetime(d, end_of_day()))
                .transpose()?,
            priority: request.priority,
        };

        let mut assignment = self.get(id)?;
        patch.apply(&mut assignment);
        self.repos.assignment_repo.update(&assignment)?;
        Ok(assignment)
    }

    /// 设置完成状态, 同步到全部任务及其日程项
    pub fn set_completed(&self, id: AssignmentId, completed: bool) -> ApiResult<Assignment> {
        let changed = self
            .repos
            .assignment_repo
            .set_completed_cascade(id, completed)?;
        let assignment = self.get(id)?;

        info!(assignment_id = id, completed, tasks = changed, "作业完成状态已更新");
        Ok(assignment)
    }

    /// 删除作业（级联任务与日程项）
    pub fn delete(&self, id: AssignmentId) -> ApiResult<()> {
        if !self.repos.assignment_repo.delete(id)? {
            return Err(ApiError::NotFound(format!("作业(id={})不存在", id)));
        }
        info!(assignment_id = id, "作业已删除");
        Ok(())
    }
}

/// 去除首尾空白后不能为空
pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Priority;

    fn request(title: &str, due: &str) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            title: title.to_string(),
            course: "MATH".to_string(),
            description: None,
            due_date: due.to_string(),
            priority: None,
        }
    }

    #[test]
    fn test_create_defaults_priority_and_end_of_day() {
        let api = AssignmentApi::new(ScheduleRepositories::in_memory());
        let assignment = api.create(request("  Problem set  ", "2026-03-04")).unwrap();

        assert_eq!(assignment.title, "Problem set");
        assert_eq!(assignment.priority, Priority::Medium);
        assert_eq!(assignment.due_date.time(), end_of_day());
        assert_eq!(assignment.estimated_time, 0);
    }

    #[test]
    fn test_create_rejects_blank_title_and_bad_date() {
        let api = AssignmentApi::new(ScheduleRepositories::in_memory());
        assert!(matches!(api.create(request("  ", "2026-03-04")), Err(ApiError::InvalidInput(_))));
        assert!(matches!(api.create(request("PS", "soon")), Err(ApiError::InvalidInput(_))));
        assert!(api.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let api = AssignmentApi::new(ScheduleRepositories::in_memory());
        let created = api.create(request("PS", "2026-03-04")).unwrap();

        let updated = api
            .update(
                created.id,
                UpdateAssignmentRequest {
                    priority: Some(Priority::High),
                    due_date: Some("2026-03-05T12:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, "PS");
        assert_eq!(api.get(created.id).unwrap().due_date.to_string(), "2026-03-05 12:00:00");

        api.delete(created.id).unwrap();
        assert!(matches!(api.get(created.id), Err(ApiError::NotFound(_))));
        assert!(matches!(api.delete(created.id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_set_completed_on_missing_assignment_is_not_found() {
        let api = AssignmentApi::new(ScheduleRepositories::in_memory());
        assert!(matches!(api.set_completed(42, true), Err(ApiError::NotFound(_))));

        let created = api.create(request("PS", "2026-03-04")).unwrap();
        assert!(api.set_completed(created.id, true).unwrap().completed);
        assert!(!api.set_completed(created.id, false).unwrap().completed);
    }
}
