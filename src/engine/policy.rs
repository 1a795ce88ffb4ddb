// ==========================================
// 学生作业规划系统 - 日程策略
// ==========================================
// 职责: 工作日边界、午休、短休的可配置策略对象
// 说明: 午休/短休是策略不是定律, 测试可用 without_breaks() 关闭
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// 午休窗口 [start_hour, end_hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunchBreak {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl LunchBreak {
    /// 小时是否落在午休窗口内
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// 每排 every_n_tasks 个任务插入 minutes 分钟短休
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroBreak {
    pub every_n_tasks: usize,
    pub minutes: i64,
}

// ==========================================
// SchedulePolicy - 日程策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePolicy {
    /// 每日开始时刻（小时），也是跨日后的游标位置
    pub day_start_hour: u32,
    /// 收工时刻（小时），游标到达后跨到次日
    pub day_end_hour: u32,
    pub lunch: Option<LunchBreak>,
    pub micro_break: Option<MicroBreak>,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            day_start_hour: 9,
            day_end_hour: 18,
            lunch: Some(LunchBreak {
                start_hour: 11,
                end_hour: 13,
            }),
            micro_break: Some(MicroBreak {
                every_n_tasks: 3,
                minutes: 15,
            }),
        }
    }
}

impl SchedulePolicy {
    /// 关闭午休与短休（区间断言类测试使用）
    pub fn without_breaks() -> Self {
        Self {
            lunch: None,
            micro_break: None,
            ..Self::default()
        }
    }

    /// 校验策略参数
    pub fn validate(&self) -> Result<(), String> {
        if self.day_start_hour >= 24 || self.day_end_hour > 24 {
            return Err(format!(
                "小时超出范围: day_start_hour={}, day_end_hour={}",
                self.day_start_hour, self.day_end_hour
            ));
        }
        if self.day_start_hour >= self.day_end_hour {
            return Err(format!(
                "day_start_hour({}) 必须早于 day_end_hour({})",
                self.day_start_hour, self.day_end_hour
            ));
        }
        if let Some(lunch) = self.lunch {
            if lunch.start_hour >= lunch.end_hour || lunch.end_hour >= 24 {
                return Err(format!(
                    "午休窗口无效: [{}, {})",
                    lunch.start_hour, lunch.end_hour
                ));
            }
        }
        if let Some(micro) = self.micro_break {
            if micro.every_n_tasks == 0 || micro.minutes < 0 {
                return Err(format!(
                    "短休参数无效: every_n_tasks={}, minutes={}",
                    micro.every_n_tasks, micro.minutes
                ));
            }
        }
        Ok(())
    }

    /// 某天的工作开始时刻
    pub fn day_start_on(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.day_start_hour)
    }

    /// 游标落在午休窗口内时，推到午休结束
    pub fn skip_lunch(&self, cursor: NaiveDateTime) -> NaiveDateTime {
        match self.lunch {
            Some(lunch) if lunch.contains(cursor.hour()) => at_hour(cursor.date(), lunch.end_hour),
            _ => cursor,
        }
    }

    /// 已放置 placed 个任务后的短休时长（分钟）
    pub fn micro_break_after(&self, placed: usize) -> i64 {
        match self.micro_break {
            Some(micro) if micro.every_n_tasks > 0 && placed % micro.every_n_tasks == 0 => {
                micro.minutes
            }
            _ => 0,
        }
    }

    /// 跨日处理
    ///
    /// 规则:
    /// 1) 游标到达收工时刻 → 次日开始时刻
    /// 2) 长任务跨过午夜、游标停在次日开工前 → 当日开始时刻
    pub fn roll_over(&self, task_start: NaiveDateTime, cursor: NaiveDateTime) -> NaiveDateTime {
        if cursor.hour() >= self.day_end_hour {
            // 日期上限处无次日, 游标原地保留
            return cursor
                .date()
                .succ_opt()
                .map_or(cursor, |next| self.day_start_on(next));
        }
        if cursor.date() > task_start.date() && cursor.hour() < self.day_start_hour {
            return self.day_start_on(cursor.date());
        }
        cursor
    }
}

/// date 的 hour:00（hour 超界时退化为午夜，validate 已保证不会发生）
fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
}
