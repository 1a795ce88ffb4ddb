// ==========================================
// 学生作业规划系统 - 领域类型定义
// ==========================================
// 职责: 优先级枚举与实体ID类型
// 红线: 优先级是等级制, high < medium < low (排序时 high 最先)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 作业ID（仓储分配的不透明整数）
pub type AssignmentId = i64;

/// 任务ID
pub type TaskId = i64;

/// 日程项ID
pub type ScheduleItemId = i64;

// ==========================================
// 作业优先级 (Priority)
// ==========================================
// 顺序: High < Medium < Low (派生 Ord 依赖变体声明顺序, 不可调整)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,   // 高
    Medium, // 中
    Low,    // 低
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("未知优先级: {}", other)),
        }
    }
}
