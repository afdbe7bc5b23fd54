//! 浏览服务路由模块

use axum::{routing::get, Router};

use crate::handlers::{
    collection_indexes, collection_overview, connection_overview, database_overview,
    document_view, health_check, list_connections, test_connection,
};
use crate::state::AppState;

/// 创建浏览路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/connections", get(list_connections))
        .route("/api/connections/{conn}/test", get(test_connection))
        .route("/api/explorer/{conn}", get(connection_overview))
        .route("/api/explorer/{conn}/{db}", get(database_overview))
        .route("/api/explorer/{conn}/{db}/{coll}", get(collection_overview))
        .route("/api/explorer/{conn}/{db}/{coll}/indexes", get(collection_indexes))
        .route("/api/explorer/{conn}/{db}/{coll}/docs/{id}", get(document_view))
        .route("/api/health", get(health_check))
}
