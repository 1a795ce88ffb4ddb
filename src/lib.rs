// ==========================================
// 学生作业规划系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 把多份作业的待办任务装入每日日程
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 规划规则
pub mod engine;

// 配置层 - 策略与进程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Assignment, NewAssignment, NewTask, Priority, ScheduleItem, ScheduleItemExpanded, Task,
    TaskWithContext,
};

// 引擎
pub use engine::{
    PrioritySorter, ScheduleAccessor, ScheduleOrchestrator, SchedulePacker, SchedulePolicy,
    ScheduleRepositories, ScheduleReport, TaskSelector, UrgencyEngine,
};

// API
pub use api::{ApiError, ApiResult, AssignmentApi, ScheduleApi, TaskApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学生作业规划系统";
