// ==========================================
// 学生作业规划系统 - 任务数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（预计用时重算由引擎层显式调用）
// 约束: (assignment_id, order) 唯一, 列表按 order 升序返回
// ==========================================

use crate::domain::task::{NewTask, Task};
use crate::domain::types::{AssignmentId, TaskId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TaskRepository Trait
// ==========================================
// 实现者: TaskRepositoryImpl（rusqlite）、MemoryStore（内存）
pub trait TaskRepository: Send + Sync {
    /// 在作业下创建任务，order 取该作业当前最大值 + 1
    ///
    /// # 返回
    /// - `Err(NotFound)`: 所属作业不存在
    fn create(&self, new_task: NewTask) -> RepositoryResult<Task>;

    /// 按ID查询
    fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// 查询作业下全部任务（order 升序）
    fn list_by_assignment(&self, assignment_id: AssignmentId) -> RepositoryResult<Vec<Task>>;

    /// 查询作业下未完成任务（order 升序）
    fn list_incomplete_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> RepositoryResult<Vec<Task>>;

    /// 整体覆盖更新（order 不在此处修改，使用 swap_order）
    fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// 交换两个任务的 order（原子操作）
    fn swap_order(&self, first: TaskId, second: TaskId) -> RepositoryResult<()>;

    /// 删除任务（级联日程项）
    fn delete(&self, id: TaskId) -> RepositoryResult<bool>;
}

// ==========================================
// TaskRepositoryImpl - SQLite 实现
// ==========================================
pub struct TaskRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"SELECT id, assignment_id, description, time_allocation,
                                       completed, sort_order, time_spent
                                FROM task"#;

impl TaskRepositoryImpl {
    /// 创建新的TaskRepositoryImpl实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 映射数据库行到Task对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            assignment_id: row.get(1)?,
            description: row.get(2)?,
            time_allocation: row.get(3)?,
            completed: row.get::<_, i32>(4)? != 0,
            order: row.get(5)?,
            time_spent: row.get(6)?,
        })
    }

    fn query_list(
        &self,
        sql: &str,
        assignment_id: AssignmentId,
    ) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let tasks = stmt
            .query_map(params![assignment_id], Self::map_row)?
            .collect::<Result<Vec<Task>, _>>()?;
        Ok(tasks)
    }
}

impl TaskRepository for TaskRepositoryImpl {
    fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT COUNT(*) FROM assignment WHERE id = ?",
                params![new_task.assignment_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)?;
        if !exists {
            return Err(RepositoryError::not_found("Assignment", new_task.assignment_id));
        }

        let order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM task WHERE assignment_id = ?",
            params![new_task.assignment_id],
            |row| row.get(0),
        )?;

        tx.execute(
            r#"INSERT INTO task (
                assignment_id, description, time_allocation, completed, sort_order, time_spent
            ) VALUES (?, ?, ?, 0, ?, 0)"#,
            params![
                new_task.assignment_id,
                &new_task.description,
                new_task.time_allocation,
                order,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Task {
            id,
            assignment_id: new_task.assignment_id,
            description: new_task.description,
            time_allocation: new_task.time_allocation,
            completed: false,
            order,
            time_spent: 0,
        })
    }

    fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::map_row,
        ) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_assignment(&self, assignment_id: AssignmentId) -> RepositoryResult<Vec<Task>> {
        self.query_list(
            &format!(
                "{} WHERE assignment_id = ? ORDER BY sort_order, id",
                SELECT_COLUMNS
            ),
            assignment_id,
        )
    }

    fn list_incomplete_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> RepositoryResult<Vec<Task>> {
        self.query_list(
            &format!(
                "{} WHERE assignment_id = ? AND completed = 0 ORDER BY sort_order, id",
                SELECT_COLUMNS
            ),
            assignment_id,
        )
    }

    fn update(&self, task: &Task) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let changed = conn.execute(
            r#"UPDATE task
               SET description = ?, time_allocation = ?, completed = ?, time_spent = ?
               WHERE id = ?"#,
            params![
                &task.description,
                task.time_allocation,
                if task.completed { 1 } else { 0 },
                task.time_spent,
                task.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::not_found("Task", task.id));
        }
        Ok(())
    }

    fn swap_order(&self, first: TaskId, second: TaskId) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let load = |id: TaskId| -> RepositoryResult<(AssignmentId, i64)> {
            match tx.query_row(
                "SELECT assignment_id, sort_order FROM task WHERE id = ?",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            ) {
                Ok(v) => Ok(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    Err(RepositoryError::not_found("Task", id))
                }
                Err(e) => Err(e.into()),
            }
        };

        let (first_assignment, first_order) = load(first)?;
        let (second_assignment, second_order) = load(second)?;
        if first_assignment != second_assignment {
            return Err(RepositoryError::ValidationError(format!(
                "只能交换同一作业内的任务: task {} 属于作业 {}, task {} 属于作业 {}",
                first, first_assignment, second, second_assignment
            )));
        }

        // (assignment_id, sort_order) 有唯一约束，先挪到临时值
        tx.execute("UPDATE task SET sort_order = -1 WHERE id = ?", params![first])?;
        tx.execute(
            "UPDATE task SET sort_order = ? WHERE id = ?",
            params![first_order, second],
        )?;
        tx.execute(
            "UPDATE task SET sort_order = ? WHERE id = ?",
            params![second_order, first],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: TaskId) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM task WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
