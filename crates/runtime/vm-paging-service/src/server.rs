//! HTTP 服务器

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::{Router, get, post};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use vm_paging::ResultSet;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::request::SimulationRequest;

/// 处理器共享状态
#[derive(Debug, Clone)]
struct AppState {
    config: Arc<ServiceConfig>,
}

/// 构建路由
pub fn router(config: ServiceConfig) -> Router {
    let cors_permissive = config.cors_permissive;
    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/simulate", post(simulate_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// 绑定地址并运行服务，直到收到 Ctrl-C
pub async fn serve(config: ServiceConfig) -> ServiceResult<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Paging simulator listening on: {}", addr);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Paging simulator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// 运行模拟
async fn simulate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ResultSet>>, ServiceError> {
    let job = SimulationRequest::from_slice(&body)?.resolve(&state.config)?;

    tracing::info!(
        requests = job.trace.len(),
        runs = job.runs(),
        frames = job.config.frame_count,
        "running simulation"
    );

    // 模拟是纯计算，放到阻塞线程池避免占用异步工作线程
    let results = tokio::task::spawn_blocking(move || job.execute())
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;

    Ok(Json(results))
}

/// 健康检查
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
