//! HTTP 服务器启动与路由装配

use crate::api;
use crate::core::{Config, ServerState};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// HTTP 服务器
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// 使用已初始化的状态构造
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 启动 HTTP 服务器，Ctrl-C 时优雅关闭
    pub async fn run(self) -> anyhow::Result<()> {
        let router = api::router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "Table server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
