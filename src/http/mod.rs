//! HTTP adapter - binds the gate to an axum router.
//!
//! Layers run outermost first: request tracing, caller identification, then
//! the gate. Admin routes are nested under the configured admin prefix and
//! carry their own capability check.

/// Settings form, status and landing document routes
pub mod admin;
/// Caller identification, gate and capability middlewares
pub mod middleware;

use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::{app::AppConfig, operators::OperatorDirectory},
    core::{content::ContentPipeline, gate::GatePolicy, render::PageRenderer},
    errors::Result,
};

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Settings and document store
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Known operator tokens
    pub operators: Arc<OperatorDirectory>,
    /// Page renderer
    pub renderer: Arc<PageRenderer>,
}

impl AppState {
    /// Builds the state, registering the page templates.
    ///
    /// # Errors
    /// Returns [`Error::Config`](crate::errors::Error::Config) if the gate
    /// configuration is invalid, or a template error if the page templates
    /// fail to register.
    pub fn new(db: DatabaseConnection, config: AppConfig, operators: OperatorDirectory) -> Result<Self> {
        config.gate.validate()?;
        let renderer = PageRenderer::new(config.site.clone(), ContentPipeline::default())?;
        Ok(Self {
            db,
            config: Arc::new(config),
            operators: Arc::new(operators),
            renderer: Arc::new(renderer),
        })
    }

    /// Gate policy derived from the configuration.
    #[must_use]
    pub fn policy(&self) -> GatePolicy {
        GatePolicy {
            api_block_status: self.config.gate.api_block_status,
        }
    }
}

/// Wraps `site` with the gate and mounts the admin routes.
///
/// Paths under the admin prefix that match no admin route are answered with
/// 404 instead of reaching `site`.
pub fn router(state: AppState, site: Router<AppState>) -> Router {
    let admin_prefix = state.config.gate.admin_prefix.clone();
    let site = site.layer(from_fn_with_state(state.clone(), middleware::confine_admin_prefix));
    Router::new()
        .nest(&admin_prefix, admin::router(state.clone()))
        .merge(site)
        .layer(from_fn_with_state(state.clone(), middleware::gate_requests))
        .layer(from_fn_with_state(state.clone(), middleware::identify_caller))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The site being gated: a health API route plus static files.
pub fn site_router(public_dir: &str) -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(ping))
        .fallback_service(ServeDir::new(public_dir))
}
