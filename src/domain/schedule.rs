// ==========================================
// 学生作业规划系统 - 日程领域模型
// ==========================================
// 红线: start_time < end_time
// 红线: 同一次生成(run_id)内的日程项互不重叠
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::assignment::Assignment;
use crate::domain::task::Task;
use crate::domain::types::{ScheduleItemId, TaskId};

// ==========================================
// ScheduleItem - 日程项
// ==========================================
// 弱引用 Task: 只用于查找, 不拥有任务生命周期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: ScheduleItemId,        // 日程项ID
    pub task_id: TaskId,           // 对应任务
    pub start_time: NaiveDateTime, // 开始时间
    pub end_time: NaiveDateTime,   // 结束时间
    pub completed: bool,           // 是否完成 (与任务完成标志由调用方同步)
    pub run_id: Uuid,              // 生成批次
}

impl ScheduleItem {
    /// 时长(分钟)
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// 两个日程项是否重叠（首尾相接不算重叠）
    pub fn overlaps(&self, other: &ScheduleItem) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// 待落库的日程项（ID 由仓储分配）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleItem {
    pub task_id: TaskId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub run_id: Uuid,
}

impl NewScheduleItem {
    pub fn into_item(self, id: ScheduleItemId) -> ScheduleItem {
        ScheduleItem {
            id,
            task_id: self.task_id,
            start_time: self.start_time,
            end_time: self.end_time,
            completed: false,
            run_id: self.run_id,
        }
    }
}

/// 日程项更新（None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemPatch {
    pub completed: Option<bool>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

impl ScheduleItemPatch {
    pub fn apply(self, item: &mut ScheduleItem) {
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
        if let Some(start_time) = self.start_time {
            item.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            item.end_time = end_time;
        }
    }
}

// ==========================================
// ScheduleItemExpanded - 展开后的日程项
// ==========================================
// 任务或作业在排程后被删除时为 None, 不报错
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemExpanded {
    #[serde(flatten)]
    pub item: ScheduleItem,
    pub task: Option<Task>,
    pub assignment: Option<Assignment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn item(start: NaiveDateTime, end: NaiveDateTime) -> ScheduleItem {
        NewScheduleItem {
            task_id: 1,
            start_time: start,
            end_time: end,
            run_id: Uuid::nil(),
        }
        .into_item(1)
    }

    #[test]
    fn test_overlap_rules() {
        let a = item(at(9, 0), at(9, 45));
        let b = item(at(9, 45), at(10, 15));
        let c = item(at(9, 30), at(10, 0));

        assert!(!a.overlaps(&b)); // 首尾相接
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert_eq!(a.duration_minutes(), 45);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut it = item(at(9, 0), at(10, 0));
        ScheduleItemPatch {
            completed: Some(true),
            ..Default::default()
        }
        .apply(&mut it);

        assert!(it.completed);
        assert_eq!(it.start_time, at(9, 0));
    }
}
