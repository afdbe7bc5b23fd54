//! Handler模块

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::errors::AppError;
use common::middleware::RequestId;
use common::models::connection::ConnectionItem;
use common::response::ApiResponse;
use common::utils::{validate_collection_name, validate_database_name};
use crate::service::{
    CollectionIndexes, CollectionOverview, ConnectionOverview, DatabaseOverview, DocumentView,
    ExplorerService,
};
use crate::state::AppState;

const SERVICE: &str = "explorer-service";

fn explorer(state: &AppState) -> ExplorerService {
    ExplorerService::new(state.pool_manager.clone(), state.config.skip_set.clone())
}

fn respond<T: Serialize>(data: T, request_id: &RequestId) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_service(data, SERVICE).with_request_id(request_id.as_str()))
}

/// 数据库路径参数
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct DatabasePath {
    /// 连接名称
    pub conn: String,
    /// 数据库名称
    #[validate(custom(function = "validate_database_name"))]
    pub db: String,
}

/// 集合路径参数
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CollectionPath {
    /// 连接名称
    pub conn: String,
    /// 数据库名称
    #[validate(custom(function = "validate_database_name"))]
    pub db: String,
    /// 集合名称
    #[validate(custom(function = "validate_collection_name"))]
    pub coll: String,
}

/// 文档路径参数
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct DocumentPath {
    /// 连接名称
    pub conn: String,
    /// 数据库名称
    #[validate(custom(function = "validate_database_name"))]
    pub db: String,
    /// 集合名称
    #[validate(custom(function = "validate_collection_name"))]
    pub coll: String,
    /// 原始文档 ID（ObjectId、整数或字符串）
    pub id: String,
}

/// 列出所有已配置的连接
#[utoipa::path(
    get,
    path = "/api/connections",
    tag = "connections",
    responses(
        (status = 200, description = "连接列表", body = ApiResponse<Vec<ConnectionItem>>)
    )
)]
pub async fn list_connections(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ConnectionItem>>>, AppError> {
    let data = state.pool_manager.list_connections().await;
    Ok(respond(data, &request_id))
}

/// 测试连接（ping）
#[utoipa::path(
    get,
    path = "/api/connections/{conn}/test",
    tag = "connections",
    params(
        ("conn" = String, Path, description = "连接名称")
    ),
    responses(
        (status = 200, description = "连接测试结果", body = ApiResponse<ConnectionTestResult>),
        (status = 404, description = "连接未找到")
    )
)]
pub async fn test_connection(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(conn): Path<String>,
) -> Result<Json<ApiResponse<ConnectionTestResult>>, AppError> {
    let result = match state.pool_manager.test_connection(&conn).await {
        Ok(latency) => ConnectionTestResult {
            name: conn,
            success: true,
            latency_ms: Some(latency.as_millis() as u64),
            error: None,
        },
        Err(e @ AppError::ConnectionNotFound(_)) => return Err(e),
        Err(e) => ConnectionTestResult {
            name: conn,
            success: false,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };
    Ok(respond(result, &request_id))
}

/// 服务器视图：统计、侧边栏、数据库列表与服务器状态
#[utoipa::path(
    get,
    path = "/api/explorer/{conn}",
    tag = "explorer",
    params(
        ("conn" = String, Path, description = "连接名称")
    ),
    responses(
        (status = 200, description = "服务器概览", body = ApiResponse<ConnectionOverview>),
        (status = 404, description = "连接未找到")
    )
)]
pub async fn connection_overview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(conn): Path<String>,
) -> Result<Json<ApiResponse<ConnectionOverview>>, AppError> {
    let data = explorer(&state).connection_overview(&conn).await?;
    Ok(respond(data, &request_id))
}

/// 数据库视图：集合统计与侧边栏
#[utoipa::path(
    get,
    path = "/api/explorer/{conn}/{db}",
    tag = "explorer",
    params(DatabasePath),
    responses(
        (status = 200, description = "数据库概览", body = ApiResponse<DatabaseOverview>),
        (status = 400, description = "数据库名称非法"),
        (status = 404, description = "连接未找到")
    )
)]
pub async fn database_overview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(path): Path<DatabasePath>,
) -> Result<Json<ApiResponse<DatabaseOverview>>, AppError> {
    path.validate()?;
    let data = explorer(&state).database_overview(&path.conn, &path.db).await?;
    Ok(respond(data, &request_id))
}

/// 集合视图：文档数与侧边栏
#[utoipa::path(
    get,
    path = "/api/explorer/{conn}/{db}/{coll}",
    tag = "explorer",
    params(CollectionPath),
    responses(
        (status = 200, description = "集合概览", body = ApiResponse<CollectionOverview>),
        (status = 400, description = "名称非法"),
        (status = 404, description = "连接、数据库或集合不存在")
    )
)]
pub async fn collection_overview(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(path): Path<CollectionPath>,
) -> Result<Json<ApiResponse<CollectionOverview>>, AppError> {
    path.validate()?;
    let data = explorer(&state)
        .collection_overview(&path.conn, &path.db, &path.coll)
        .await?;
    Ok(respond(data, &request_id))
}

/// 列出集合索引
#[utoipa::path(
    get,
    path = "/api/explorer/{conn}/{db}/{coll}/indexes",
    tag = "explorer",
    params(CollectionPath),
    responses(
        (status = 200, description = "索引列表", body = ApiResponse<CollectionIndexes>),
        (status = 404, description = "连接、数据库或集合不存在")
    )
)]
pub async fn collection_indexes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(path): Path<CollectionPath>,
) -> Result<Json<ApiResponse<CollectionIndexes>>, AppError> {
    path.validate()?;
    let data = explorer(&state)
        .collection_indexes(&path.conn, &path.db, &path.coll)
        .await?;
    Ok(respond(data, &request_id))
}

/// 根据原始 ID 解析并返回文档
#[utoipa::path(
    get,
    path = "/api/explorer/{conn}/{db}/{coll}/docs/{id}",
    tag = "explorer",
    params(DocumentPath),
    responses(
        (status = 200, description = "文档详情", body = ApiResponse<DocumentView>),
        (status = 404, description = "文档未找到")
    )
)]
pub async fn document_view(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(path): Path<DocumentPath>,
) -> Result<Json<ApiResponse<DocumentView>>, AppError> {
    path.validate()?;
    let data = explorer(&state)
        .document_view(&path.conn, &path.db, &path.coll, &path.id)
        .await?;
    tracing::debug!(id = %path.id, id_type = %data.id_type, "Document resolved");
    Ok(respond(data, &request_id))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        connections: state.pool_manager.connection_count().await,
    })
}

/// 连接测试结果
#[derive(Serialize, ToSchema)]
pub struct ConnectionTestResult {
    /// 连接名称
    pub name: String,
    /// 测试是否成功
    pub success: bool,
    /// 连接延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// 错误信息（如果测试失败）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 已配置连接数
    pub connections: usize,
}
