// ==========================================
// 学生作业规划系统 - 日程策略读取 Trait
// ==========================================
// 职责: 定义生成流程所需的策略读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

use crate::engine::policy::SchedulePolicy;

/// 配置层 Result 别名
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// SchedulePolicyReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、StaticPolicyReader（固定策略）
#[async_trait]
pub trait SchedulePolicyReader: Send + Sync {
    /// 获取当前生效的日程策略
    ///
    /// # 默认值
    /// - 9:00 开工, 18:00 收工
    /// - 午休 11:00-13:00
    /// - 每 3 个任务短休 15 分钟
    async fn get_schedule_policy(&self) -> ConfigResult<SchedulePolicy>;
}

/// 固定策略（内存部署与测试使用）
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyReader {
    policy: SchedulePolicy,
}

impl StaticPolicyReader {
    pub fn new(policy: SchedulePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl SchedulePolicyReader for StaticPolicyReader {
    async fn get_schedule_policy(&self) -> ConfigResult<SchedulePolicy> {
        Ok(self.policy.clone())
    }
}
