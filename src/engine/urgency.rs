// ==========================================
// 学生作业规划系统 - 紧急判定引擎
// ==========================================
// 职责: 按日历日期判定候选任务是否“今日到期或已逾期”
// 红线: 只比较日期, 不比较时刻
// ==========================================

use chrono::NaiveDateTime;

use crate::domain::task::TaskWithContext;

// ==========================================
// UrgencyEngine - 紧急判定引擎
// ==========================================
pub struct UrgencyEngine {
    // 无状态引擎
}

impl UrgencyEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 截止日期不晚于参考日期即为紧急
    pub fn is_urgent(&self, due_date: NaiveDateTime, reference: NaiveDateTime) -> bool {
        due_date.date() <= reference.date()
    }

    /// 拆分为 (紧急, 非紧急)，各自保持输入顺序
    pub fn partition(
        &self,
        tasks: Vec<TaskWithContext>,
        reference: NaiveDateTime,
    ) -> (Vec<TaskWithContext>, Vec<TaskWithContext>) {
        tasks
            .into_iter()
            .partition(|t| self.is_urgent(t.due_date, reference))
    }
}

impl Default for UrgencyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_due_later_today_is_urgent() {
        let engine = UrgencyEngine::new();
        // 今天 23 点到期, 参考时刻 9 点 → 紧急
        assert!(engine.is_urgent(at(2, 23), at(2, 9)));
        // 今天 8 点已过期 → 紧急
        assert!(engine.is_urgent(at(2, 8), at(2, 9)));
        // 昨天到期 → 紧急
        assert!(engine.is_urgent(at(1, 12), at(2, 9)));
        // 明天 0 点 → 非紧急
        assert!(!engine.is_urgent(at(3, 0), at(2, 23)));
    }
}
