// ==========================================
// 学生作业规划系统 - 内存仓储
// ==========================================
// 用途: 测试与无持久化部署（PLANNER_STORAGE=memory）
// 结构: 实体按自增整数ID存放(arena + index), 实体之间只保存ID不保存引用
// 级联: 与 SQLite 外键语义一致, 在同一把锁内完成
// ==========================================

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::domain::assignment::{Assignment, NewAssignment};
use crate::domain::schedule::{NewScheduleItem, ScheduleItem};
use crate::domain::task::{NewTask, Task};
use crate::domain::types::{AssignmentId, ScheduleItemId, TaskId};
use crate::repository::assignment_repo::AssignmentRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::schedule_item_repo::{day_bounds, ScheduleItemRepository};
use crate::repository::task_repo::TaskRepository;

#[derive(Debug, Default)]
struct MemoryTables {
    assignments: BTreeMap<AssignmentId, Assignment>,
    tasks: BTreeMap<TaskId, Task>,
    schedule_items: BTreeMap<ScheduleItemId, ScheduleItem>,
    // 日程项ID → 生成时的目标日期
    target_days: BTreeMap<ScheduleItemId, NaiveDate>,
    next_assignment_id: AssignmentId,
    next_task_id: TaskId,
    next_schedule_item_id: ScheduleItemId,
}

impl MemoryTables {
    fn delete_task_cascade(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(&id).is_none() {
            return false;
        }
        self.schedule_items.retain(|_, item| item.task_id != id);
        let items = &self.schedule_items;
        self.target_days.retain(|item_id, _| items.contains_key(item_id));
        true
    }

    fn sorted_tasks<F>(&self, assignment_id: AssignmentId, filter: F) -> Vec<Task>
    where
        F: Fn(&Task) -> bool,
    {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.assignment_id == assignment_id && filter(t))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.order, t.id));
        tasks
    }
}

// ==========================================
// MemoryStore - 三类仓储的内存实现
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryTables>> {
        self.tables
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl AssignmentRepository for MemoryStore {
    fn create(&self, new_assignment: NewAssignment) -> RepositoryResult<Assignment> {
        let mut tables = self.lock()?;
        tables.next_assignment_id += 1;
        let assignment = new_assignment.into_assignment(tables.next_assignment_id);
        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn find_by_id(&self, id: AssignmentId) -> RepositoryResult<Option<Assignment>> {
        Ok(self.lock()?.assignments.get(&id).cloned())
    }

    fn list_all(&self) -> RepositoryResult<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> =
            self.lock()?.assignments.values().cloned().collect();
        assignments.sort_by_key(|a| (a.due_date, a.id));
        Ok(assignments)
    }

    fn update(&self, assignment: &Assignment) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        match tables.assignments.get_mut(&assignment.id) {
            Some(slot) => {
                *slot = assignment.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Assignment", assignment.id)),
        }
    }

    fn delete(&self, id: AssignmentId) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        if tables.assignments.remove(&id).is_none() {
            return Ok(false);
        }

        let task_ids: Vec<TaskId> = tables
            .tasks
            .values()
            .filter(|t| t.assignment_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in task_ids {
            tables.delete_task_cascade(task_id);
        }
        Ok(true)
    }

    fn set_completed_cascade(&self, id: AssignmentId, completed: bool) -> RepositoryResult<usize> {
        let mut tables = self.lock()?;
        let tables = &mut *tables;
        match tables.assignments.get_mut(&id) {
            Some(assignment) => assignment.completed = completed,
            None => return Err(RepositoryError::not_found("Assignment", id)),
        }

        let mut task_ids = Vec::new();
        for task in tables.tasks.values_mut().filter(|t| t.assignment_id == id) {
            task.completed = completed;
            task_ids.push(task.id);
        }
        for item in tables
            .schedule_items
            .values_mut()
            .filter(|item| task_ids.contains(&item.task_id))
        {
            item.completed = completed;
        }
        Ok(task_ids.len())
    }
}

impl TaskRepository for MemoryStore {
    fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        let mut tables = self.lock()?;
        if !tables.assignments.contains_key(&new_task.assignment_id) {
            return Err(RepositoryError::not_found("Assignment", new_task.assignment_id));
        }

        let order = tables
            .tasks
            .values()
            .filter(|t| t.assignment_id == new_task.assignment_id)
            .map(|t| t.order)
            .max()
            .unwrap_or(0)
            + 1;

        tables.next_task_id += 1;
        let task = Task {
            id: tables.next_task_id,
            assignment_id: new_task.assignment_id,
            description: new_task.description,
            time_allocation: new_task.time_allocation,
            completed: false,
            order,
            time_spent: 0,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    fn list_by_assignment(&self, assignment_id: AssignmentId) -> RepositoryResult<Vec<Task>> {
        Ok(self.lock()?.sorted_tasks(assignment_id, |_| true))
    }

    fn list_incomplete_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> RepositoryResult<Vec<Task>> {
        Ok(self.lock()?.sorted_tasks(assignment_id, |t| !t.completed))
    }

    fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        match tables.tasks.get_mut(&task.id) {
            Some(slot) => {
                // order 只能通过 swap_order 修改
                let order = slot.order;
                *slot = task.clone();
                slot.order = order;
                Ok(())
            }
            None => Err(RepositoryError::not_found("Task", task.id)),
        }
    }

    fn swap_order(&self, first: TaskId, second: TaskId) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        let (first_assignment, first_order) = tables
            .tasks
            .get(&first)
            .map(|t| (t.assignment_id, t.order))
            .ok_or_else(|| RepositoryError::not_found("Task", first))?;
        let (second_assignment, second_order) = tables
            .tasks
            .get(&second)
            .map(|t| (t.assignment_id, t.order))
            .ok_or_else(|| RepositoryError::not_found("Task", second))?;

        if first_assignment != second_assignment {
            return Err(RepositoryError::ValidationError(format!(
                "只能交换同一作业内的任务: task {} 属于作业 {}, task {} 属于作业 {}",
                first, first_assignment, second, second_assignment
            )));
        }

        if let Some(task) = tables.tasks.get_mut(&first) {
            task.order = second_order;
        }
        if let Some(task) = tables.tasks.get_mut(&second) {
            task.order = first_order;
        }
        Ok(())
    }

    fn delete(&self, id: TaskId) -> RepositoryResult<bool> {
        Ok(self.lock()?.delete_task_cascade(id))
    }
}

impl ScheduleItemRepository for MemoryStore {
    fn find_by_id(&self, id: ScheduleItemId) -> RepositoryResult<Option<ScheduleItem>> {
        Ok(self.lock()?.schedule_items.get(&id).cloned())
    }

    fn list_by_day(&self, day: NaiveDate) -> RepositoryResult<Vec<ScheduleItem>> {
        let (from, to) = day_bounds(day);
        let mut items: Vec<ScheduleItem> = self
            .lock()?
            .schedule_items
            .values()
            .filter(|item| item.start_time >= from && item.start_time < to)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.start_time, item.id));
        Ok(items)
    }

    fn list_by_task(&self, task_id: TaskId) -> RepositoryResult<Vec<ScheduleItem>> {
        let mut items: Vec<ScheduleItem> = self
            .lock()?
            .schedule_items
            .values()
            .filter(|item| item.task_id == task_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.start_time, item.id));
        Ok(items)
    }

    fn update(&self, item: &ScheduleItem) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        match tables.schedule_items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("ScheduleItem", item.id)),
        }
    }

    fn set_completed_by_task(&self, task_id: TaskId, completed: bool) -> RepositoryResult<usize> {
        let mut tables = self.lock()?;
        let mut changed = 0;
        for item in tables
            .schedule_items
            .values_mut()
            .filter(|item| item.task_id == task_id)
        {
            item.completed = completed;
            changed += 1;
        }
        Ok(changed)
    }

    fn replace_for_day(
        &self,
        day: NaiveDate,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Vec<ScheduleItem>> {
        let mut tables = self.lock()?;

        // 先校验外键，保证失败时不留下半截日程
        // 只清空为 day 生成的项, 前一天溢出到 day 的项保留
        if let Some(missing) = items.iter().find(|item| !tables.tasks.contains_key(&item.task_id)) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "schedule_item.task_id={} 不存在",
                missing.task_id
            )));
        }

        let stale: Vec<ScheduleItemId> = tables
            .target_days
            .iter()
            .filter(|(_, target)| **target == day)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            tables.schedule_items.remove(id);
            tables.target_days.remove(id);
        }

        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            tables.next_schedule_item_id += 1;
            let saved_item = item.into_item(tables.next_schedule_item_id);
            tables.schedule_items.insert(saved_item.id, saved_item.clone());
            tables.target_days.insert(saved_item.id, day);
            saved.push(saved_item);
        }
        Ok(saved)
    }
}
