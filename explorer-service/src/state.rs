//! Application state for the explorer service.

use std::sync::Arc;
use common::config::AppConfig;
use common::errors::AppResult;
use crate::pool_manager::PoolManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool_manager: Arc<PoolManager>,
}

impl AppState {
    /// Creates the state and registers the configured connections.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let pool_manager = PoolManager::load(config.clone()).await?;
        Ok(Self {
            pool_manager: Arc::new(pool_manager),
            config,
        })
    }
}
