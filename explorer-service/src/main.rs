//! 文档数据库浏览服务
//!
//! 为管理控制台提供只读浏览功能，包括：
//! - 服务器 / 数据库 / 集合三级统计聚合
//! - 侧边栏拓扑（数据库 → 集合）
//! - 文档 ID 类型解析（ObjectId → 整数 → 字符串）

mod explorer;
mod handlers;
mod mongo_store;
mod pool_manager;
mod routes;
mod service;
mod state;
mod store;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::AppConfig;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "explorer-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "浏览服务 API",
        version = "0.1.0",
        description = "文档数据库浏览微服务"
    ),
    paths(
        handlers::list_connections,
        handlers::test_connection,
        handlers::connection_overview,
        handlers::database_overview,
        handlers::collection_overview,
        handlers::collection_indexes,
        handlers::document_view,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ConnectionItem,
        common::models::CollectionStats,
        common::models::IdType,
        common::models::MediaField,
        common::models::MediaFields,
        service::ConnectionOverview,
        service::DatabaseOverview,
        service::CollectionOverview,
        service::CollectionIndexes,
        service::DocumentView,
        handlers::ConnectionTestResult,
        handlers::HealthResponse,
    )),
    tags(
        (name = "connections", description = "连接端点"),
        (name = "explorer", description = "浏览端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 创建应用状态（读取连接配置文件）
    let state = AppState::new(config.clone())
        .await
        .with_context(|| format!("loading connections from {}", config.connections_file))?;
    info!(
        connections = state.pool_manager.connection_count().await,
        skipped = ?config.skip_set.iter().collect::<Vec<_>>(),
        "应用状态已初始化"
    );

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            // Only set if not already set by the environment
            if std::env::var(key).is_err() {
                std::env::set_var(key, value.trim().trim_matches('"'));
            }
        }
    }
}
