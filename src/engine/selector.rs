// ==========================================
// 学生作业规划系统 - 任务选择引擎
// ==========================================
// 职责: 收集指定作业的未完成任务, 附加作业上下文
// 输出: TaskWithContext 扁平列表（作业间无顺序保证）
// 红线: 只读; 未知作业ID静默跳过
// ==========================================

use std::collections::HashSet;

use tracing::debug;

use crate::domain::assignment::Assignment;
use crate::domain::task::TaskWithContext;
use crate::domain::types::AssignmentId;
use crate::engine::repositories::ScheduleRepositories;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// TaskSelector - 任务选择引擎
// ==========================================
pub struct TaskSelector {
    repos: ScheduleRepositories,
}

impl TaskSelector {
    pub fn new(repos: ScheduleRepositories) -> Self {
        Self { repos }
    }

    /// 收集候选任务
    ///
    /// # 参数
    /// - `assignment_ids`: 作业ID（重复ID只处理一次）
    ///
    /// # 返回
    /// 各作业未完成任务, 作业内按 order 升序
    pub fn select_candidate_tasks(
        &self,
        assignment_ids: &[AssignmentId],
    ) -> RepositoryResult<Vec<TaskWithContext>> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for &assignment_id in assignment_ids {
            if !seen.insert(assignment_id) {
                continue;
            }

            let Some(assignment) = self.repos.assignment_repo.find_by_id(assignment_id)? else {
                debug!(assignment_id, "作业不存在, 跳过");
                continue;
            };

            let tasks = self
                .repos
                .task_repo
                .list_incomplete_by_assignment(assignment_id)?;
            candidates.extend(tasks.into_iter().map(|task| TaskWithContext {
                task,
                assignment_title: assignment.title.clone(),
                due_date: assignment.due_date,
                priority: assignment.priority,
            }));
        }

        debug!(
            requested = assignment_ids.len(),
            candidates = candidates.len(),
            "候选任务收集完成"
        );
        Ok(candidates)
    }

    /// 重算作业预计用时 = 全部任务分配时间之和
    ///
    /// 在任务新建、分配时间修改、删除之后显式调用
    pub fn recompute_estimated_time(
        &self,
        assignment_id: AssignmentId,
    ) -> RepositoryResult<Assignment> {
        let mut assignment = self
            .repos
            .assignment_repo
            .find_by_id(assignment_id)?
            .ok_or_else(|| RepositoryError::not_found("Assignment", assignment_id))?;

        // 直接写库的超大分配时间在此饱和, 不溢出
        let total = self
            .repos
            .task_repo
            .list_by_assignment(assignment_id)?
            .iter()
            .fold(0i64, |acc, t| acc.saturating_add(t.time_allocation));

        if assignment.estimated_time != total {
            assignment.estimated_time = total;
            self.repos.assignment_repo.update(&assignment)?;
        }
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::NewAssignment;
    use crate::domain::task::NewTask;
    use crate::domain::types::Priority;
    use chrono::NaiveDate;

    fn new_assignment(title: &str, day: u32, priority: Priority) -> NewAssignment {
        NewAssignment {
            title: title.to_string(),
            course: "CS101".to_string(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2026, 3, day)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
            priority,
        }
    }

    fn new_task(assignment_id: AssignmentId, description: &str, minutes: i64) -> NewTask {
        NewTask {
            assignment_id,
            description: description.to_string(),
            time_allocation: minutes,
        }
    }

    #[test]
    fn test_select_skips_unknown_and_completed() {
        let repos = ScheduleRepositories::in_memory();
        let essay = repos
            .assignment_repo
            .create(new_assignment("Essay", 5, Priority::High))
            .unwrap();
        let outline = repos.task_repo.create(new_task(essay.id, "outline", 30)).unwrap();
        let draft = repos.task_repo.create(new_task(essay.id, "draft", 60)).unwrap();

        let mut done = outline.clone();
        done.completed = true;
        repos.task_repo.update(&done).unwrap();

        let selector = TaskSelector::new(repos);
        let candidates = selector
            .select_candidate_tasks(&[essay.id, 999, essay.id])
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].task_id(), draft.id);
        assert_eq!(candidates[0].assignment_title, "Essay");
        assert_eq!(candidates[0].priority, Priority::High);
        assert_eq!(candidates[0].due_date, essay.due_date);
    }

    #[test]
    fn test_select_keeps_task_order_within_assignment() {
        let repos = ScheduleRepositories::in_memory();
        let lab = repos
            .assignment_repo
            .create(new_assignment("Lab", 4, Priority::Medium))
            .unwrap();
        let first = repos.task_repo.create(new_task(lab.id, "a", 10)).unwrap();
        let second = repos.task_repo.create(new_task(lab.id, "b", 10)).unwrap();
        repos.task_repo.swap_order(first.id, second.id).unwrap();

        let selector = TaskSelector::new(repos);
        let ids: Vec<i64> = selector
            .select_candidate_tasks(&[lab.id])
            .unwrap()
            .iter()
            .map(|t| t.task_id())
            .collect();

        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_recompute_estimated_time_saturates() {
        let repos = ScheduleRepositories::in_memory();
        let essay = repos
            .assignment_repo
            .create(new_assignment("Essay", 5, Priority::Low))
            .unwrap();
        repos.task_repo.create(new_task(essay.id, "a", i64::MAX)).unwrap();
        repos.task_repo.create(new_task(essay.id, "b", i64::MAX)).unwrap();

        let selector = TaskSelector::new(repos);
        let assignment = selector.recompute_estimated_time(essay.id).unwrap();
        assert_eq!(assignment.estimated_time, i64::MAX);
    }

    #[test]
    fn test_recompute_estimated_time() {
        let repos = ScheduleRepositories::in_memory();
        let essay = repos
            .assignment_repo
            .create(new_assignment("Essay", 5, Priority::Low))
            .unwrap();
        repos.task_repo.create(new_task(essay.id, "a", 30)).unwrap();
        let b = repos.task_repo.create(new_task(essay.id, "b", 45)).unwrap();

        let selector = TaskSelector::new(repos.clone());
        assert_eq!(selector.recompute_estimated_time(essay.id).unwrap().estimated_time, 75);

        repos.task_repo.delete(b.id).unwrap();
        selector.recompute_estimated_time(essay.id).unwrap();
        let stored = repos.assignment_repo.find_by_id(essay.id).unwrap().unwrap();
        assert_eq!(stored.estimated_time, 30);
    }

    #[test]
    fn test_recompute_unknown_assignment_is_not_found() {
        let selector = TaskSelector::new(ScheduleRepositories::in_memory());
        assert!(matches!(
            selector.recompute_estimated_time(42),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
