// ==========================================
// 学生作业规划系统 - 日程项数据仓储
// ==========================================
// 红线: replace_for_day 必须在单个事务中完成“清空-写入”
// 清空口径: 为目标日期生成的日程项(target_day), 包括其跨日溢出项
// ==========================================

use crate::db::{format_datetime, parse_datetime_column};
use crate::domain::schedule::{NewScheduleItem, ScheduleItem};
use crate::domain::types::{ScheduleItemId, TaskId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ScheduleItemRepository Trait
// ==========================================
// 实现者: ScheduleItemRepositoryImpl（rusqlite）、MemoryStore（内存）
pub trait ScheduleItemRepository: Send + Sync {
    /// 按ID查询
    fn find_by_id(&self, id: ScheduleItemId) -> RepositoryResult<Option<ScheduleItem>>;

    /// 查询某天开始的日程项（start_time 升序）
    fn list_by_day(&self, day: NaiveDate) -> RepositoryResult<Vec<ScheduleItem>>;

    /// 查询任务的全部日程项（start_time 升序）
    fn list_by_task(&self, task_id: TaskId) -> RepositoryResult<Vec<ScheduleItem>>;

    /// 整体覆盖更新（不存在时返回 NotFound）
    fn update(&self, item: &ScheduleItem) -> RepositoryResult<()>;

    /// 同步任务的全部日程项完成标志，返回受影响条数
    fn set_completed_by_task(&self, task_id: TaskId, completed: bool) -> RepositoryResult<usize>;

    /// 原子替换某天的日程
    ///
    /// # 参数
    /// - `day`: 目标日期
    /// - `items`: 新日程项（可跨日）
    ///
    /// # 返回
    /// 落库后的日程项（带ID，保持输入顺序）
    fn replace_for_day(
        &self,
        day: NaiveDate,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Vec<ScheduleItem>>;
}

/// 生成目标日期的库内文本（YYYY-MM-DD）
fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// 当天 [00:00, 次日00:00) 区间
pub(crate) fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

// ==========================================
// ScheduleItemRepositoryImpl - SQLite 实现
// ==========================================
pub struct ScheduleItemRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"SELECT id, task_id, start_time, end_time, completed, run_id
                                FROM schedule_item"#;

impl ScheduleItemRepositoryImpl {
    /// 创建新的ScheduleItemRepositoryImpl实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 映射数据库行到ScheduleItem对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduleItem> {
        let run_raw: String = row.get(5)?;
        let run_id = Uuid::parse_str(&run_raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(ScheduleItem {
            id: row.get(0)?,
            task_id: row.get(1)?,
            start_time: parse_datetime_column(&row.get::<_, String>(2)?, 2)?,
            end_time: parse_datetime_column(&row.get::<_, String>(3)?, 3)?,
            completed: row.get::<_, i32>(4)? != 0,
            run_id,
        })
    }

    /// 在事务中清空为目标日期生成的日程（含其跨日溢出项）
    ///
    /// 前一天溢出到当天的项属于前一天的日程, 不在清空范围内
    fn clear_day_tx(tx: &Transaction, day: NaiveDate) -> RepositoryResult<usize> {
        let deleted = tx.execute(
            "DELETE FROM schedule_item WHERE target_day = ?",
            params![format_day(day)],
        )?;
        Ok(deleted)
    }
}

impl ScheduleItemRepository for ScheduleItemRepositoryImpl {
    fn find_by_id(&self, id: ScheduleItemId) -> RepositoryResult<Option<ScheduleItem>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::map_row,
        ) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_day(&self, day: NaiveDate) -> RepositoryResult<Vec<ScheduleItem>> {
        let conn = self.get_conn()?;
        let (from, to) = day_bounds(day);

        let mut stmt = conn.prepare(&format!(
            "{} WHERE start_time >= ? AND start_time < ? ORDER BY start_time, id",
            SELECT_COLUMNS
        ))?;
        let items = stmt
            .query_map(
                params![format_datetime(&from), format_datetime(&to)],
                Self::map_row,
            )?
            .collect::<Result<Vec<ScheduleItem>, _>>()?;

        Ok(items)
    }

    fn list_by_task(&self, task_id: TaskId) -> RepositoryResult<Vec<ScheduleItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE task_id = ? ORDER BY start_time, id",
            SELECT_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![task_id], Self::map_row)?
            .collect::<Result<Vec<ScheduleItem>, _>>()?;

        Ok(items)
    }

    fn update(&self, item: &ScheduleItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let changed = conn.execute(
            r#"UPDATE schedule_item
               SET start_time = ?, end_time = ?, completed = ?
               WHERE id = ?"#,
            params![
                format_datetime(&item.start_time),
                format_datetime(&item.end_time),
                if item.completed { 1 } else { 0 },
                item.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::not_found("ScheduleItem", item.id));
        }
        Ok(())
    }

    fn set_completed_by_task(&self, task_id: TaskId, completed: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE schedule_item SET completed = ? WHERE task_id = ?",
            params![if completed { 1 } else { 0 }, task_id],
        )?;
        Ok(changed)
    }

    fn replace_for_day(
        &self,
        day: NaiveDate,
        items: Vec<NewScheduleItem>,
    ) -> RepositoryResult<Vec<ScheduleItem>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let cleared = Self::clear_day_tx(&tx, day)?;
        tracing::debug!(day = %day, cleared, "已清空旧日程");

        let mut saved = Vec::with_capacity(items.len());
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO schedule_item (
                    task_id, start_time, end_time, completed, run_id, target_day
                ) VALUES (?, ?, ?, 0, ?, ?)"#,
            )?;

            for item in items {
                stmt.execute(params![
                    item.task_id,
                    format_datetime(&item.start_time),
                    format_datetime(&item.end_time),
                    item.run_id.to_string(),
                    format_day(day),
                ])?;
                let id = tx.last_insert_rowid();
                saved.push(item.into_item(id));
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        Ok(saved)
    }
}
