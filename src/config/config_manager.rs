// ==========================================
// 学生作业规划系统 - 配置管理器
// ==========================================
// 职责: 日程策略覆写的加载、查询、写入
// 存储: config_kv 表 (key-value)
// 红线: 写入前整体校验, 非法值不落库
// ==========================================

use crate::config::policy_reader::{ConfigResult, SchedulePolicyReader};
use crate::db::open_sqlite_connection;
use crate::engine::policy::{LunchBreak, MicroBreak, SchedulePolicy};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入一项日程策略覆写
    ///
    /// # 参数
    /// - key: `config_keys` 中的键
    /// - value: 文本值
    ///
    /// # 返回
    /// - Err: 未知键、值格式错误或合并后的策略非法
    pub fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(format!("未知配置键: {}", key).into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut values = Self::load_values(&conn)?;
        values.insert(key.to_string(), value.trim().to_string());
        policy_from_values(&values)?;

        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;

        tracing::info!(config_key = key, value = value.trim(), "日程策略配置已更新");
        Ok(())
    }

    /// 获取所有日程策略配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<HashMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        Self::load_values(&conn)
    }

    fn load_values(conn: &Connection) -> ConfigResult<HashMap<String, String>> {
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE key LIKE 'schedule.%' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            values.insert(key, value);
        }
        Ok(values)
    }
}

// ==========================================
// SchedulePolicyReader Trait 实现
// ==========================================
#[async_trait]
impl SchedulePolicyReader for ConfigManager {
    async fn get_schedule_policy(&self) -> ConfigResult<SchedulePolicy> {
        let values = self.get_config_snapshot()?;
        policy_from_values(&values)
    }
}

/// 以默认策略为底, 叠加覆写值
fn policy_from_values(values: &HashMap<String, String>) -> ConfigResult<SchedulePolicy> {
    let defaults = SchedulePolicy::default();
    let default_lunch = defaults.lunch.unwrap_or(LunchBreak {
        start_hour: 11,
        end_hour: 13,
    });
    let default_micro = defaults.micro_break.unwrap_or(MicroBreak {
        every_n_tasks: 3,
        minutes: 15,
    });

    let lunch_enabled = parse_or(values, config_keys::LUNCH_ENABLED, true)?;
    let micro_enabled = parse_or(values, config_keys::MICRO_BREAK_ENABLED, true)?;

    let policy = SchedulePolicy {
        day_start_hour: parse_or(values, config_keys::DAY_START_HOUR, defaults.day_start_hour)?,
        day_end_hour: parse_or(values, config_keys::DAY_END_HOUR, defaults.day_end_hour)?,
        lunch: if lunch_enabled {
            Some(LunchBreak {
                start_hour: parse_or(values, config_keys::LUNCH_START_HOUR, default_lunch.start_hour)?,
                end_hour: parse_or(values, config_keys::LUNCH_END_HOUR, default_lunch.end_hour)?,
            })
        } else {
            None
        },
        micro_break: if micro_enabled {
            Some(MicroBreak {
                every_n_tasks: parse_or(
                    values,
                    config_keys::MICRO_BREAK_EVERY,
                    default_micro.every_n_tasks,
                )?,
                minutes: parse_or(values, config_keys::MICRO_BREAK_MINUTES, default_micro.minutes)?,
            })
        } else {
            None
        },
    };

    policy.validate()?;
    Ok(policy)
}

fn parse_or<T>(values: &HashMap<String, String>, key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match values.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("配置值格式错误: {}={} ({})", key, raw, e).into()),
        None => Ok(default),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工作日边界
    pub const DAY_START_HOUR: &str = "schedule.day_start_hour";
    pub const DAY_END_HOUR: &str = "schedule.day_end_hour";

    // 午休
    pub const LUNCH_START_HOUR: &str = "schedule.lunch_start_hour";
    pub const LUNCH_END_HOUR: &str = "schedule.lunch_end_hour";
    pub const LUNCH_ENABLED: &str = "schedule.lunch_enabled";

    // 短休
    pub const MICRO_BREAK_EVERY: &str = "schedule.micro_break_every";
    pub const MICRO_BREAK_MINUTES: &str = "schedule.micro_break_minutes";
    pub const MICRO_BREAK_ENABLED: &str = "schedule.micro_break_enabled";

    pub const ALL: [&str; 8] = [
        DAY_START_HOUR,
        DAY_END_HOUR,
        LUNCH_START_HOUR,
        LUNCH_END_HOUR,
        LUNCH_ENABLED,
        MICRO_BREAK_EVERY,
        MICRO_BREAK_MINUTES,
        MICRO_BREAK_ENABLED,
    ];
}
