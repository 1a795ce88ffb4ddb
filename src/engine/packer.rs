// ==========================================
// 学生作业规划系统 - 日程装箱引擎
// ==========================================
// 职责: 按排序结果为任务分配连续时间段
// 输入: OrderedCandidates + 起始游标 + 可用分钟数(可选)
// 输出: PackResult（已放置时间段 + 未排任务 + 汇总）
// ==========================================
// 红线:
// 1) 紧急任务无条件放置, 预算只约束非紧急任务
// 2) 任务不拆分; 跨日只在任务边界发生
// 3) 预算一旦不足, 后续非紧急任务全部进入未排列表
// ==========================================

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::task::TaskWithContext;
use crate::domain::types::{AssignmentId, TaskId};
use crate::engine::policy::SchedulePolicy;
use crate::engine::priority::{OrderedCandidates, PrioritySorter};


/// 装箱错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// 分配时间或推进后的游标超出可表示的时间范围
    #[error("任务(id={task_id})的时间超出范围: 开始 {start}, 分配 {minutes} 分钟")]
    TimeOutOfRange {
        task_id: TaskId,
        start: NaiveDateTime,
        minutes: i64,
    },
}

/// 已放置的时间段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBlock {
    pub task_id: TaskId,
    pub assignment_id: AssignmentId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub urgent: bool,
}

/// 未排任务（ID 引用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledTask {
    pub task_id: TaskId,
    pub assignment_id: AssignmentId,
}

/// 未排任务明细（供前端提示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledTaskDetail {
    pub task_id: TaskId,
    pub description: String,
    pub assignment_title: String,
    pub time_allocation: i64,
}

/// 装箱结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackResult {
    pub blocks: Vec<PlacedBlock>,
    pub not_scheduled: Vec<UnscheduledTask>,
    pub unscheduled_task_details: Vec<UnscheduledTaskDetail>,
    /// 已放置任务分配时间之和
    pub total_tasks_time: i64,
    /// 紧急任务分配时间之和（无论是否放置）
    pub todays_due_tasks_time: i64,
    /// 未放置的紧急任务数
    pub todays_unscheduled_count: usize,
    /// 已放置但超出预算的紧急任务数（提示用）
    pub urgent_over_budget_count: usize,
    /// 在预算内追加的非紧急任务数（未给预算时为0）
    pub extra_tasks_added: usize,
}

impl PackResult {
    fn skip(&mut self, task: &TaskWithContext, urgent: bool) {
        if urgent {
            self.todays_unscheduled_count += 1;
        }
        self.not_scheduled.push(UnscheduledTask {
            task_id: task.task_id(),
            assignment_id: task.assignment_id(),
        });
        self.unscheduled_task_details.push(UnscheduledTaskDetail {
            task_id: task.task_id(),
            description: task.task.description.clone(),
            assignment_title: task.assignment_title.clone(),
            time_allocation: task.time_allocation(),
        });
    }
}

// ==========================================
// 游标: 放置状态
// ==========================================
struct Cursor<'a> {
    policy: &'a SchedulePolicy,
    at: NaiveDateTime,
    placed: usize,
    minutes_used: i64,
}

impl<'a> Cursor<'a> {
    fn new(policy: &'a SchedulePolicy, start: NaiveDateTime) -> Self {
        Self {
            policy,
            at: start,
            placed: 0,
            minutes_used: 0,
        }
    }

    /// 预算是否还能容纳该任务（无预算时恒为 true）
    fn fits(&self, task: &TaskWithContext, available_minutes: Option<i64>) -> bool {
        available_minutes.map_or(true, |budget| {
            self.minutes_used
                .checked_add(task.time_allocation())
                .is_some_and(|total| total <= budget)
        })
    }

    /// 放置一个任务
    fn admit(&mut self, task: &TaskWithContext, urgent: bool) -> Result<PlacedBlock, PackError> {
        // 1. 午休整段插在任务之前
        let start = self.policy.skip_lunch(self.at);
        let out_of_range = || PackError::TimeOutOfRange {
            task_id: task.task_id(),
            start,
            minutes: task.time_allocation(),
        };
        let end = Duration::try_minutes(task.time_allocation())
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(out_of_range)?;

        // 2. 推进游标, 每 N 个任务插入短休
        self.placed += 1;
        let after_break = Duration::try_minutes(self.policy.micro_break_after(self.placed))
            .and_then(|pause| end.checked_add_signed(pause))
            .ok_or_else(out_of_range)?;

        // 3. 到达收工时刻则跨日
        self.at = self.policy.roll_over(start, after_break);
        self.minutes_used = self.minutes_used.saturating_add(task.time_allocation());

        Ok(PlacedBlock {
            task_id: task.task_id(),
            assignment_id: task.assignment_id(),
            start_time: start,
            end_time: end,
            urgent,
        })
    }
}

// ==========================================
// SchedulePacker - 日程装箱引擎
// ==========================================
pub struct SchedulePacker {
    policy: SchedulePolicy,
    sorter: PrioritySorter,
}

impl SchedulePacker {
    /// 构造函数
    ///
    /// # 参数
    /// - `policy`: 日程策略（午休/短休/工作日边界）
    pub fn new(policy: SchedulePolicy) -> Self {
        Self {
            policy,
            sorter: PrioritySorter::new(),
        }
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 装箱
    ///
    /// # 参数
    /// - `ordered`: 已拆分排序的候选任务
    /// - `start`: 起始游标
    /// - `available_minutes`: 可用分钟数, None 表示不限
    /// - `prioritize_todays_due`: true 时紧急任务无条件放置;
    ///   false 时紧急与非紧急合并排序, 全部受预算约束
    ///
    /// # 返回
    /// - Err(TimeOutOfRange): 某个任务的结束时间无法表示
    /// - Ok(PackResult): 预算不足的任务在 not_scheduled 中, 不是错误
    #[instrument(skip(self, ordered), fields(
        urgent_count = ordered.urgent.len(),
        future_count = ordered.future.len(),
        start = %start,
    ))]
    pub fn pack(
        &self,
        ordered: OrderedCandidates,
        start: NaiveDateTime,
        available_minutes: Option<i64>,
        prioritize_todays_due: bool,
    ) -> Result<PackResult, PackError> {
        let mut result = PackResult::default();
        if ordered.is_empty() {
            return Ok(result);
        }

        let mut cursor = Cursor::new(&self.policy, start);

        if prioritize_todays_due {
            // 紧急任务: 无条件放置
            for task in &ordered.urgent {
                if !cursor.fits(task, available_minutes) {
                    result.urgent_over_budget_count += 1;
                }
                result.todays_due_tasks_time =
                    result.todays_due_tasks_time.saturating_add(task.time_allocation());
                result.blocks.push(cursor.admit(task, true)?);
            }

            // 非紧急任务: 预算内逐个放置, 预算不足后全部进入未排
            let mut budget_open = true;
            for task in &ordered.future {
                if budget_open && cursor.fits(task, available_minutes) {
                    result.blocks.push(cursor.admit(task, false)?);
                    if available_minutes.is_some() {
                        result.extra_tasks_added += 1;
                    }
                } else {
                    budget_open = false;
                    result.skip(task, false);
                }
            }
        } else {
            let mut budget_open = true;
            for (task, urgent) in self.sorter.merge(ordered) {
                if urgent {
                    result.todays_due_tasks_time =
                        result.todays_due_tasks_time.saturating_add(task.time_allocation());
                }
                if budget_open && cursor.fits(&task, available_minutes) {
                    result.blocks.push(cursor.admit(&task, urgent)?);
                    if !urgent && available_minutes.is_some() {
                        result.extra_tasks_added += 1;
                    }
                } else {
                    budget_open = false;
                    result.skip(&task, urgent);
                }
            }
        }

        result.total_tasks_time = cursor.minutes_used;

        debug!(
            placed = result.blocks.len(),
            not_scheduled = result.not_scheduled.len(),
            minutes_used = cursor.minutes_used,
            "装箱完成"
        );

        Ok(result)
    }
}
