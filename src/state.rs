use crate::config::Config;
use crate::db::DbPool;
use std::sync::Arc;

/// Shared by every handler behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<Config>) -> Arc<Self> {
        Arc::new(Self { pool, config })
    }
}
