//! 服务运行时

use std::net::SocketAddr;

use config::AppConfig;
use errors::{AppError, AppResult};
use telemetry::{init_metrics_exporter, init_tracing, init_tracing_json};
use tracing::{error, info};

/// 初始化服务运行时
///
/// 生产环境输出 JSON 日志；配置了 `telemetry.metrics_addr` 时暴露 Prometheus 端点。
/// 需要在 tokio runtime 内调用。
pub fn init_runtime(config: &AppConfig) -> AppResult<()> {
    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    if let Some(addr) = &config.telemetry.metrics_addr {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid metrics address {}: {}", addr, e)))?;
        init_metrics_exporter(addr)
            .map_err(|e| AppError::internal(format!("Failed to install metrics exporter: {}", e)))?;
        info!(%addr, "Metrics exporter listening");
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );

    Ok(())
}

/// 等待关闭信号
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
