use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::selection::SelectionManager;
use crate::summary::client::SummaryClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub summary: SummaryClient,
    pub selection: SelectionManager,
}
