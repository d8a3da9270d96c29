use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::notify::NotificationSink;
use crate::submission::resume::ResumeStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every external handle is constructed once in `main()`; no
/// component reaches into ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Object-storage handle for resume uploads; `None` when the upload is
    /// disabled by config.
    pub resume_store: Option<Arc<ResumeStore>>,
    /// The notification sinks active for this deployment, assembled at
    /// startup from config.
    pub sinks: Arc<[Arc<dyn NotificationSink>]>,
    pub config: Config,
}
