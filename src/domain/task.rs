// ==========================================
// 学生作业规划系统 - 任务领域模型
// ==========================================
// 红线: time_allocation > 0, time_spent >= 0
// 红线: order 在同一作业内唯一, 交换操作可重新编号
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AssignmentId, Priority, TaskId};

// ==========================================
// Task - 任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,                   // 任务ID
    pub assignment_id: AssignmentId,  // 所属作业
    pub description: String,          // 任务描述
    pub time_allocation: i64,         // 分配时间(分钟)
    pub completed: bool,              // 是否完成
    pub order: i64,                   // 作业内顺序
    pub time_spent: i64,              // 已用时间(分钟)
}

/// 新建任务的输入（ID 与 order 由仓储分配）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub assignment_id: AssignmentId,
    pub description: String,
    pub time_allocation: i64,
}

/// 任务字段更新（None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub description: Option<String>,
    pub time_allocation: Option<i64>,
}

impl TaskPatch {
    pub fn apply(self, task: &mut Task) {
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(time_allocation) = self.time_allocation {
            task.time_allocation = time_allocation;
        }
    }
}

// ==========================================
// TaskWithContext - 带作业上下文的候选任务
// ==========================================
// 用途: Task Selector 输出, 排序与装箱的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithContext {
    pub task: Task,
    pub assignment_title: String,
    pub due_date: NaiveDateTime,
    pub priority: Priority,
}

impl TaskWithContext {
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    pub fn assignment_id(&self) -> AssignmentId {
        self.task.assignment_id
    }

    pub fn time_allocation(&self) -> i64 {
        self.task.time_allocation
    }
}
