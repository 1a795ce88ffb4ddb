// ==========================================
// 学生作业规划系统 - 作业领域模型
// ==========================================
// 红线: estimated_time 由任务分配时间求和得到, 不接受外部直接写入
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AssignmentId, Priority};

// ==========================================
// Assignment - 作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,            // 作业ID
    pub title: String,               // 标题
    pub course: String,              // 所属课程
    pub description: Option<String>, // 说明
    pub due_date: NaiveDateTime,     // 截止时间 (本地时间)
    pub priority: Priority,          // 优先级
    pub estimated_time: i64,         // 预计用时(分钟) = 子任务分配时间之和
    pub completed: bool,             // 是否完成
}

/// 新建作业的输入（ID 由仓储分配）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    pub course: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub priority: Priority,
}

impl NewAssignment {
    /// 物化为实体（新作业没有任务, 预计用时为0）
    pub fn into_assignment(self, id: AssignmentId) -> Assignment {
        Assignment {
            id,
            title: self.title,
            course: self.course,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            estimated_time: 0,
            completed: false,
        }
    }
}

/// 作业字段更新（None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub course: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub priority: Option<Priority>,
}

impl AssignmentPatch {
    pub fn apply(self, assignment: &mut Assignment) {
        if let Some(title) = self.title {
            assignment.title = title;
        }
        if let Some(course) = self.course {
            assignment.course = course;
        }
        if let Some(description) = self.description {
            assignment.description = Some(description);
        }
        if let Some(due_date) = self.due_date {
            assignment.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            assignment.priority = priority;
        }
    }
}
