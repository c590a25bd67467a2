use std::sync::Arc;

use axum::extract::FromRef;
use deadpool_sqlite::Pool;

use super::HttpClient;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: Pool,
    pub args: Arc<Cli>,
    pub http_client: HttpClient,
}

impl AppState {
    pub fn new(pool: Pool, args: Arc<Cli>) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::new(args.http_timeout_seconds)?;
        Ok(Self { pool, args, http_client })
    }
}

impl FromRef<AppState> for Pool {
    fn from_ref(state: &AppState) -> Self {
        // pool uses an Arc internally so clone is cheap
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Cli> {
    fn from_ref(state: &AppState) -> Self {
        state.args.clone()
    }
}
