// ==========================================
// 学生作业规划系统 - 日程查询引擎
// ==========================================
// 职责: 查询某天日程, 展开任务与作业
// 红线: 任务/作业已删除时填 None, 不报错
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::assignment::Assignment;
use crate::domain::schedule::ScheduleItemExpanded;
use crate::domain::task::Task;
use crate::domain::types::{AssignmentId, TaskId};
use crate::engine::repositories::ScheduleRepositories;
use crate::repository::error::RepositoryResult;

pub struct ScheduleAccessor {
    repos: ScheduleRepositories,
}

impl ScheduleAccessor {
    pub fn new(repos: ScheduleRepositories) -> Self {
        Self { repos }
    }

    /// 某天开始的日程项（start_time 升序）
    pub fn get_schedule_for_day(&self, day: NaiveDate) -> RepositoryResult<Vec<ScheduleItemExpanded>> {
        let mut items = self.repos.schedule_item_repo.list_by_day(day)?;
        items.sort_by_key(|item| (item.start_time, item.id));

        // 同一任务/作业只查一次
        let mut tasks: HashMap<TaskId, Option<Task>> = HashMap::new();
        let mut assignments: HashMap<AssignmentId, Option<Assignment>> = HashMap::new();

        let mut expanded = Vec::with_capacity(items.len());
        for item in items {
            let task = match tasks.get(&item.task_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self.repos.task_repo.find_by_id(item.task_id)?;
                    tasks.insert(item.task_id, found.clone());
                    found
                }
            };

            let assignment = match &task {
                Some(task) => match assignments.get(&task.assignment_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let found = self.repos.assignment_repo.find_by_id(task.assignment_id)?;
                        assignments.insert(task.assignment_id, found.clone());
                        found
                    }
                },
                None => None,
            };

            expanded.push(ScheduleItemExpanded {
                item,
                task,
                assignment,
            });
        }

        Ok(expanded)
    }
}
