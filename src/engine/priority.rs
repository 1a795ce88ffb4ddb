// ==========================================
// 学生作业规划系统 - 排序策略引擎
// ==========================================
// 职责: 拆分紧急/非紧急任务, 并在各组内排序
// 输入: Task Selector 输出的候选任务
// 输出: OrderedCandidates（紧急组在前）
// ==========================================

use crate::domain::task::TaskWithContext;
use crate::engine::urgency::UrgencyEngine;
use chrono::NaiveDateTime;
use std::cmp::Ordering;


/// 排序后的候选任务
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedCandidates {
    /// 今日到期或已逾期
    pub urgent: Vec<TaskWithContext>,
    /// 其余任务
    pub future: Vec<TaskWithContext>,
}

impl OrderedCandidates {
    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.future.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urgent.len() + self.future.len()
    }
}

// ==========================================
// PrioritySorter - 排序策略引擎
// ==========================================
pub struct PrioritySorter {
    urgency: UrgencyEngine,
}

impl PrioritySorter {
    /// 构造函数
    pub fn new() -> Self {
        Self {
            urgency: UrgencyEngine::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 拆分并排序
    ///
    /// 排序键:
    /// 1) priority 升序 (high 最先)
    /// 2) due_date 升序 (早到期优先)
    ///
    /// 稳定排序: 两键相同的任务保持输入顺序（即作业内 order 顺序）
    pub fn classify_and_order(
        &self,
        tasks: Vec<TaskWithContext>,
        reference: NaiveDateTime,
    ) -> OrderedCandidates {
        let (urgent, future) = self.urgency.partition(tasks, reference);
        OrderedCandidates {
            urgent: self.sort(urgent),
            future: self.sort(future),
        }
    }

    /// 稳定排序
    pub fn sort(&self, mut tasks: Vec<TaskWithContext>) -> Vec<TaskWithContext> {
        tasks.sort_by(|a, b| self.compare(a, b));
        tasks
    }

    /// 不区分紧急度的合并序列（紧急标志随任务返回）
    ///
    /// 紧急组先于非紧急组拼接后再稳定排序，两键相同时紧急任务在前
    pub fn merge(&self, ordered: OrderedCandidates) -> Vec<(TaskWithContext, bool)> {
        let mut merged: Vec<(TaskWithContext, bool)> = ordered
            .urgent
            .into_iter()
            .map(|t| (t, true))
            .chain(ordered.future.into_iter().map(|t| (t, false)))
            .collect();
        merged.sort_by(|a, b| self.compare(&a.0, &b.0));
        merged
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &TaskWithContext, b: &TaskWithContext) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.due_date.cmp(&b.due_date))
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}
