// ==========================================
// 学生作业规划系统 - 引擎编排器
// ==========================================
// 主流程: 选择 → 排序 → 装箱 → 落库
// 红线: 落库为“清空-写入”单事务; 同一次生成共享 run_id
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::schedule::{NewScheduleItem, ScheduleItem};
use crate::domain::types::AssignmentId;
use crate::engine::packer::{
    PackError, PackResult, SchedulePacker, UnscheduledTask, UnscheduledTaskDetail,
};
use crate::engine::policy::SchedulePolicy;
use crate::engine::priority::PrioritySorter;
use crate::engine::repositories::ScheduleRepositories;
use crate::engine::selector::TaskSelector;
use crate::repository::error::RepositoryError;

/// 生成流程错误
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Pack(#[from] PackError),
}

// ==========================================
// ScheduleRequest - 生成请求（已校验）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub assignment_ids: Vec<AssignmentId>,
    /// 起始游标, 同时作为紧急判定的参考时刻
    pub start: NaiveDateTime,
    pub available_minutes: Option<i64>,
    pub prioritize_todays_due: bool,
}

// ==========================================
// ScheduleReport - 生成结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    pub schedule_items: Vec<ScheduleItem>,
    pub not_scheduled: Vec<UnscheduledTask>,
    pub total_tasks_time: i64,
    pub todays_due_tasks_time: i64,
    pub todays_unscheduled_count: usize,
    pub urgent_over_budget_count: usize,
    pub extra_tasks_added: usize,
    pub unscheduled_task_details: Vec<UnscheduledTaskDetail>,
    pub run_id: Uuid,
}

impl ScheduleReport {
    fn from_pack(pack: PackResult, schedule_items: Vec<ScheduleItem>, run_id: Uuid) -> Self {
        Self {
            schedule_items,
            not_scheduled: pack.not_scheduled,
            total_tasks_time: pack.total_tasks_time,
            todays_due_tasks_time: pack.todays_due_tasks_time,
            todays_unscheduled_count: pack.todays_unscheduled_count,
            urgent_over_budget_count: pack.urgent_over_budget_count,
            extra_tasks_added: pack.extra_tasks_added,
            unscheduled_task_details: pack.unscheduled_task_details,
            run_id,
        }
    }
}

// ==========================================
// ScheduleOrchestrator - 引擎编排器
// ==========================================
pub struct ScheduleOrchestrator {
    repos: ScheduleRepositories,
    selector: TaskSelector,
    sorter: PrioritySorter,
}

impl ScheduleOrchestrator {
    /// 创建新的编排器实例
    pub fn new(repos: ScheduleRepositories) -> Self {
        Self {
            selector: TaskSelector::new(repos.clone()),
            sorter: PrioritySorter::new(),
            repos,
        }
    }

    /// 执行完整生成流程
    ///
    /// # 参数
    /// - `request`: 已校验的生成请求
    /// - `policy`: 本次生成使用的日程策略
    ///
    /// # 返回
    /// 生成报告（含落库后的日程项）
    #[instrument(skip(self, request, policy), fields(
        assignments = request.assignment_ids.len(),
        start = %request.start,
    ))]
    pub fn generate(
        &self,
        request: &ScheduleRequest,
        policy: &SchedulePolicy,
    ) -> Result<ScheduleReport, ScheduleError> {
        // 步骤1: 候选任务
        let candidates = self
            .selector
            .select_candidate_tasks(&request.assignment_ids)?;
        debug!(candidates = candidates.len(), "步骤1: 候选任务收集完成");

        // 步骤2: 紧急拆分 + 排序
        let ordered = self.sorter.classify_and_order(candidates, request.start);
        debug!(
            urgent = ordered.urgent.len(),
            future = ordered.future.len(),
            "步骤2: 排序完成"
        );

        // 步骤3: 装箱
        let packer = SchedulePacker::new(policy.clone());
        let pack = packer.pack(
            ordered,
            request.start,
            request.available_minutes,
            request.prioritize_todays_due,
        )?;

        // 步骤4: 落库（覆盖当日旧日程）
        let run_id = Uuid::new_v4();
        let new_items: Vec<NewScheduleItem> = pack
            .blocks
            .iter()
            .map(|block| NewScheduleItem {
                task_id: block.task_id,
                start_time: block.start_time,
                end_time: block.end_time,
                run_id,
            })
            .collect();
        let saved = self
            .repos
            .schedule_item_repo
            .replace_for_day(request.start.date(), new_items)?;

        info!(
            run_id = %run_id,
            scheduled = saved.len(),
            not_scheduled = pack.not_scheduled.len(),
            total_minutes = pack.total_tasks_time,
            "日程生成完成"
        );

        Ok(ScheduleReport::from_pack(pack, saved, run_id))
    }
}
