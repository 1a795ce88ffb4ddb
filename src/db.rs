// ==========================================
// 学生作业规划系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联依赖 foreign_keys=ON）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建库脚本集中在此处，仓储层不做 DDL
// ==========================================

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 库内时间文本格式（ISO 顺序，支持字符串比较）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS assignment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    course TEXT NOT NULL,
    description TEXT,
    due_date TEXT NOT NULL,
    priority TEXT NOT NULL,
    estimated_time INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    assignment_id INTEGER NOT NULL REFERENCES assignment(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    time_allocation INTEGER NOT NULL CHECK (time_allocation > 0),
    completed INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL,
    time_spent INTEGER NOT NULL DEFAULT 0 CHECK (time_spent >= 0),
    UNIQUE (assignment_id, sort_order)
);

CREATE INDEX IF NOT EXISTS idx_task_assignment ON task(assignment_id, sort_order);

CREATE TABLE IF NOT EXISTS schedule_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES task(id) ON DELETE CASCADE,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    run_id TEXT NOT NULL,
    target_day TEXT NOT NULL,
    CHECK (start_time < end_time)
);

CREATE INDEX IF NOT EXISTS idx_schedule_item_start ON schedule_item(start_time);
CREATE INDEX IF NOT EXISTS idx_schedule_item_run ON schedule_item(run_id);
CREATE INDEX IF NOT EXISTS idx_schedule_item_target_day ON schedule_item(target_day);

CREATE TABLE IF NOT EXISTS config_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启，否则级联删除不生效
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开 SQLite 内存库（测试用）
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    migrate_schedule_item_target_day(conn)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// v1 → v2: schedule_item 增加 target_day（生成该项时的目标日期）
///
/// 旧数据按同批次(run_id)最早开始时间的日期回填
fn migrate_schedule_item_target_day(conn: &Connection) -> rusqlite::Result<()> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schedule_item' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    if !has_table {
        return Ok(());
    }

    let has_column: bool = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info('schedule_item') WHERE name = 'target_day'",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    if has_column {
        return Ok(());
    }

    conn.execute_batch(
        r#"ALTER TABLE schedule_item ADD COLUMN target_day TEXT NOT NULL DEFAULT '';
           UPDATE schedule_item
           SET target_day = (
               SELECT substr(MIN(s.start_time), 1, 10)
               FROM schedule_item s
               WHERE s.run_id = schedule_item.run_id
           );"#,
    )?;
    tracing::info!("schedule_item 已补充 target_day 列");
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 时间 → 库内文本
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// 库内文本 → 时间（列解析失败转换为 rusqlite 转换错误）
pub fn parse_datetime_column(raw: &str, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
