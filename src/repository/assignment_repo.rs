// ==========================================
// 学生作业规划系统 - 作业数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 级联: 删除作业 → 删除任务 → 删除日程项（外键 ON DELETE CASCADE）
// ==========================================

use crate::db::{format_datetime, parse_datetime_column};
use crate::domain::assignment::{Assignment, NewAssignment};
use crate::domain::types::{AssignmentId, Priority};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AssignmentRepository Trait
// ==========================================
// 实现者: AssignmentRepositoryImpl（rusqlite）、MemoryStore（内存）
pub trait AssignmentRepository: Send + Sync {
    /// 创建作业，返回带ID的实体
    fn create(&self, new_assignment: NewAssignment) -> RepositoryResult<Assignment>;

    /// 按ID查询
    fn find_by_id(&self, id: AssignmentId) -> RepositoryResult<Option<Assignment>>;

    /// 查询全部作业（截止时间升序，同截止时间按ID升序）
    fn list_all(&self) -> RepositoryResult<Vec<Assignment>>;

    /// 整体覆盖更新（不存在时返回 NotFound）
    fn update(&self, assignment: &Assignment) -> RepositoryResult<()>;

    /// 删除作业（级联任务与日程项）
    ///
    /// # 返回
    /// - `Ok(true)`: 已删除
    /// - `Ok(false)`: 记录不存在
    fn delete(&self, id: AssignmentId) -> RepositoryResult<bool>;

    /// 设置作业完成状态, 并在同一事务内同步到其全部任务及这些任务的日程项
    ///
    /// # 返回
    /// - `Ok(n)`: 同步的任务数
    /// - `Err(NotFound)`: 作业不存在, 不做任何修改
    fn set_completed_cascade(&self, id: AssignmentId, completed: bool) -> RepositoryResult<usize>;
}

// ==========================================
// AssignmentRepositoryImpl - SQLite 实现
// ==========================================
pub struct AssignmentRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepositoryImpl {
    /// 创建新的AssignmentRepositoryImpl实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 映射数据库行到Assignment对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Assignment> {
        let priority_raw: String = row.get(5)?;
        let priority = priority_raw
            .parse::<Priority>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into()))?;

        Ok(Assignment {
            id: row.get(0)?,
            title: row.get(1)?,
            course: row.get(2)?,
            description: row.get(3)?,
            due_date: parse_datetime_column(&row.get::<_, String>(4)?, 4)?,
            priority,
            estimated_time: row.get(6)?,
            completed: row.get::<_, i32>(7)? != 0,
        })
    }
}

const SELECT_COLUMNS: &str = r#"SELECT id, title, course, description, due_date,
                                       priority, estimated_time, completed
                                FROM assignment"#;

impl AssignmentRepository for AssignmentRepositoryImpl {
    fn create(&self, new_assignment: NewAssignment) -> RepositoryResult<Assignment> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO assignment (
                title, course, description, due_date, priority, estimated_time, completed
            ) VALUES (?, ?, ?, ?, ?, 0, 0)"#,
            params![
                &new_assignment.title,
                &new_assignment.course,
                &new_assignment.description,
                format_datetime(&new_assignment.due_date),
                new_assignment.priority.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(new_assignment.into_assignment(id))
    }

    fn find_by_id(&self, id: AssignmentId) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::map_row,
        ) {
            Ok(assignment) => Ok(Some(assignment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY due_date, id", SELECT_COLUMNS))?;
        let assignments = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<Assignment>, _>>()?;

        Ok(assignments)
    }

    fn update(&self, assignment: &Assignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let changed = conn.execute(
            r#"UPDATE assignment
               SET title = ?, course = ?, description = ?, due_date = ?,
                   priority = ?, estimated_time = ?, completed = ?
               WHERE id = ?"#,
            params![
                &assignment.title,
                &assignment.course,
                &assignment.description,
                format_datetime(&assignment.due_date),
                assignment.priority.as_str(),
                assignment.estimated_time,
                if assignment.completed { 1 } else { 0 },
                assignment.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::not_found("Assignment", assignment.id));
        }
        Ok(())
    }

    fn delete(&self, id: AssignmentId) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM assignment WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    fn set_completed_cascade(&self, id: AssignmentId, completed: bool) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let flag = if completed { 1 } else { 0 };

        let changed = tx.execute(
            "UPDATE assignment SET completed = ? WHERE id = ?",
            params![flag, id],
        )?;
        if changed == 0 {
            // tx 丢弃即回滚
            return Err(RepositoryError::not_found("Assignment", id));
        }

        let tasks = tx.execute(
            "UPDATE task SET completed = ? WHERE assignment_id = ?",
            params![flag, id],
        )?;
        tx.execute(
            r#"UPDATE schedule_item SET completed = ?
               WHERE task_id IN (SELECT id FROM task WHERE assignment_id = ?)"#,
            params![flag, id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;
        Ok(tasks)
    }
}
