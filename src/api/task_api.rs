// ==========================================
// 学生作业规划系统 - 任务 API
// ==========================================
// 职责: 任务增删改查、完成状态、用时记录、顺序交换
// 红线: 分配时间变化后显式重算作业预计用时
// 红线: 全部任务完成 ⇔ 作业完成
// ==========================================

use tracing::{debug, info};

use crate::api::assignment_api::require_text;
use crate::api::dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::task::{NewTask, Task, TaskPatch};
use crate::domain::types::{AssignmentId, TaskId};
use crate::engine::repositories::ScheduleRepositories;
use crate::engine::selector::TaskSelector;

// ==========================================
// TaskApi - 任务 API
// ==========================================
pub struct TaskApi {
    repos: ScheduleRepositories,
    selector: TaskSelector,
}

impl TaskApi {
    pub fn new(repos: ScheduleRepositories) -> Self {
        Self {
            selector: TaskSelector::new(repos.clone()),
            repos,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn get(&self, id: TaskId) -> ApiResult<Task> {
        self.repos
            .task_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("任务(id={})不存在", id)))
    }

    /// 作业下全部任务（order 升序）
    pub fn list_by_assignment(&self, assignment_id: AssignmentId) -> ApiResult<Vec<Task>> {
        if self.repos.assignment_repo.find_by_id(assignment_id)?.is_none() {
            return Err(ApiError::NotFound(format!("作业(id={})不存在", assignment_id)));
        }
        Ok(self.repos.task_repo.list_by_assignment(assignment_id)?)
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 在作业下新建任务
    ///
    /// # 返回
    /// - Err(InvalidInput): 描述为空或分配时间 <= 0
    /// - Err(NotFound): 作业不存在
    pub fn create(&self, assignment_id: AssignmentId, request: CreateTaskRequest) -> ApiResult<Task> {
        let description = require_text("description", &request.description)?;
        validate_allocation(request.time_allocation)?;

        let task = self.repos.task_repo.create(NewTask {
            assignment_id,
            description,
            time_allocation: request.time_allocation,
        })?;

        self.selector.recompute_estimated_time(assignment_id)?;
        self.sync_assignment_completion(assignment_id)?;

        info!(task_id = task.id, assignment_id, minutes = task.time_allocation, "任务已创建");
        Ok(task)
    }

    /// 更新描述/分配时间
    pub fn update(&self, id: TaskId, request: UpdateTaskRequest) -> ApiResult<Task> {
        let patch = TaskPatch {
            description: request
                .description
                .as_deref()
                .map(|d| require_text("description", d))
                .transpose()?,
            time_allocation: request
                .time_allocation
                .map(|m| validate_allocation(m).map(|_| m))
                .transpose()?,
        };

        let mut task = self.get(id)?;
        let allocation_changed = patch
            .time_allocation
            .is_some_and(|m| m != task.time_allocation);
        patch.apply(&mut task);
        self.repos.task_repo.update(&task)?;

        if allocation_changed {
            self.selector.recompute_estimated_time(task.assignment_id)?;
        }
        Ok(task)
    }

    /// 设置完成状态, 同步日程项与作业
    pub fn set_completed(&self, id: TaskId, completed: bool) -> ApiResult<Task> {
        let mut task = self.get(id)?;
        task.completed = completed;
        self.repos.task_repo.update(&task)?;
        self.repos
            .schedule_item_repo
            .set_completed_by_task(id, completed)?;
        self.sync_assignment_completion(task.assignment_id)?;
        Ok(task)
    }

    /// 累加用时（分钟, 可为负）, 结果不小于0
    pub fn record_time_spent(&self, id: TaskId, minutes: i64) -> ApiResult<Task> {
        let mut task = self.get(id)?;
        task.time_spent = task.time_spent.saturating_add(minutes).max(0);
        self.repos.task_repo.update(&task)?;
        debug!(task_id = id, time_spent = task.time_spent, "用时已记录");
        Ok(task)
    }

    /// 交换同一作业内两个任务的顺序
    pub fn swap_order(&self, first: TaskId, second: TaskId) -> ApiResult<Vec<Task>> {
        if first == second {
            return Err(ApiError::InvalidInput("不能与自身交换顺序".to_string()));
        }
        self.repos.task_repo.swap_order(first, second)?;
        let task = self.get(first)?;
        Ok(self.repos.task_repo.list_by_assignment(task.assignment_id)?)
    }

    /// 删除任务（级联日程项）并重算作业预计用时
    pub fn delete(&self, id: TaskId) -> ApiResult<()> {
        let task = self.get(id)?;
        if !self.repos.task_repo.delete(id)? {
            return Err(ApiError::NotFound(format!("任务(id={})不存在", id)));
        }
        self.selector.recompute_estimated_time(task.assignment_id)?;
        self.sync_assignment_completion(task.assignment_id)?;
        info!(task_id = id, assignment_id = task.assignment_id, "任务已删除");
        Ok(())
    }

    /// 作业完成标志 = 全部任务完成（无任务时保持不变）
    fn sync_assignment_completion(&self, assignment_id: AssignmentId) -> ApiResult<()> {
        let tasks = self.repos.task_repo.list_by_assignment(assignment_id)?;
        if tasks.is_empty() {
            return Ok(());
        }

        let all_completed = tasks.iter().all(|t| t.completed);
        if let Some(mut assignment) = self.repos.assignment_repo.find_by_id(assignment_id)? {
            if assignment.completed != all_completed {
                assignment.completed = all_completed;
                self.repos.assignment_repo.update(&assignment)?;
                debug!(assignment_id, completed = all_completed, "作业完成状态已同步");
            }
        }
        Ok(())
    }
}

/// 单个任务分配时间上限: 7 天
pub const MAX_TIME_ALLOCATION: i64 = 7 * 24 * 60;

fn validate_allocation(minutes: i64) -> ApiResult<()> {
    if minutes <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "分配时间必须大于0分钟: {}",
            minutes
        )));
    }
    if minutes > MAX_TIME_ALLOCATION {
        return Err(ApiError::InvalidInput(format!(
            "分配时间不能超过{}分钟: {}",
            MAX_TIME_ALLOCATION, minutes
        )));
    }
    Ok(())
}
