mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AddonConfig;
use crate::db::Database;
use crate::hipchat::ChatApi;
use crate::command::{Dispatcher, ParameterRegistry};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub chat: Arc<dyn ChatApi>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<AddonConfig>,
}

impl AppState {
    pub fn new(
        db: Database,
        registry: Arc<ParameterRegistry>,
        chat: Arc<dyn ChatApi>,
        config: AddonConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(registry, Arc::new(db.clone()), chat.clone());
        Self {
            db,
            chat,
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // HipChat Connect lifecycle
        .route("/", get(handlers::capabilities))
        .route("/installable", post(handlers::install))
        .route("/installable/{oauth_id}", delete(handlers::uninstall))
        // Slash command webhook
        .route("/standup", post(handlers::standup))
        // Health
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
