// ==========================================
// 学生作业规划系统 - HTTP 主入口
// ==========================================
// 技术栈: axum + Rust + SQLite
// 配置: 环境变量（见 config::app_config）
// ==========================================

use std::sync::Arc;

use study_planner::app::{build_router, AppState};
use study_planner::config::{AppConfig, LogFormat};
use study_planner::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;

    // 初始化日志系统
    match config.log_format {
        LogFormat::Json => logging::init_json(),
        LogFormat::Text => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", study_planner::APP_NAME);
    tracing::info!("系统版本: {}", study_planner::VERSION);
    tracing::info!("==================================================");

    let state = AppState::new(&config).map_err(|e| anyhow::anyhow!("无法初始化AppState: {}", e))?;
    tracing::info!("AppState初始化成功");

    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(bind = %config.bind, "HTTP 服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "监听退出信号失败");
        std::future::pending::<()>().await;
    }
}
