//! Application state management

use database::postgres::DatabaseConnection;
use std::sync::Arc;

/// Shared application state; cloning shares the connection pool
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: Arc<DatabaseConnection>,
}
