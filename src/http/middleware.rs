//! Request middlewares: caller identification, the access gate, and the
//! admin capability check.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use super::AppState;
use crate::{
    core::{
        access::Caller,
        gate::{self, GateDecision, RequestKind},
        render::{API_BLOCK_MESSAGE, API_BLOCK_TITLE},
    },
    errors::{Error, Result},
};

/// Header reporting the active mode on pages served to signed-in callers.
pub const MODE_HEADER: &str = "x-maintenance-mode";

/// Cookie carrying an operator token for browser sessions.
pub const TOKEN_COOKIE: &str = "gate_token";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
}

/// Resolves the operator token, if any, and attaches a [`Caller`] to the request.
pub async fn identify_caller(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers()).or_else(|| cookie_token(req.headers()));
    let caller = state.operators.authenticate(token.as_deref());
    if let Some(name) = caller.name() {
        debug!("Request from operator {}", name);
    }
    req.extensions_mut().insert(caller);
    next.run(req).await
}

/// Intercepts anonymous requests while a gating mode is active.
pub async fn gate_requests(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let caller = req.extensions().get::<Caller>().cloned().unwrap_or_default();
    let kind = state.config.gate.classify(req.uri().path());

    let outcome = gate::intercept_request(
        &state.db,
        &state.db,
        &state.policy(),
        caller.is_authenticated(),
        kind,
        Utc::now(),
    )
    .await?;

    match outcome.decision {
        GateDecision::PassThrough => {
            let mut response = next.run(req).await;
            if caller.is_authenticated() && outcome.mode.is_active() {
                response
                    .headers_mut()
                    .insert(MODE_HEADER, HeaderValue::from_static(outcome.mode.as_str()));
            }
            Ok(response)
        }
        GateDecision::Landing { status: code, document } => {
            info!(
                "Serving landing document {} for {} ({})",
                document.id,
                req.uri().path(),
                code
            );
            let page = state.renderer.landing_page(&document)?;
            Ok((status(code), Html(page)).into_response())
        }
        GateDecision::RejectApi { status: code } => {
            info!("Rejecting API call to {} ({})", req.uri().path(), code);
            let body = json!({
                "code": "maintenance_mode",
                "message": API_BLOCK_MESSAGE,
                "data": { "status": code, "title": API_BLOCK_TITLE },
            });
            Ok((status(code), Json(body)).into_response())
        }
        GateDecision::Fallback { status: code } => {
            info!("Serving fallback message for {} ({})", req.uri().path(), code);
            let page = state.renderer.fallback_page()?;
            Ok((status(code), Html(page)).into_response())
        }
    }
}

/// Keeps the gated site out of the admin prefix.
///
/// Admin paths skip the gate, so anything the site would serve there (a
/// static file, a catch-all route) must not be reachable. Registered admin
/// routes never pass through this layer.
pub async fn confine_admin_prefix(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.config.gate.classify(req.uri().path()) == RequestKind::Admin {
        debug!("No admin route for {}", req.uri().path());
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

/// Lets the request through only if the caller holds the configured
/// settings capability.
pub async fn require_capability(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let required = state.config.gate.settings_capability;
    let caller = req.extensions().get::<Caller>().cloned().unwrap_or_default();

    if !caller.is_authenticated() {
        return Err(Error::Unauthenticated);
    }
    if !caller.can(required) {
        warn!(
            "Operator {:?} lacks {} for {}",
            caller.name(),
            required,
            req.uri().path()
        );
        return Err(Error::PermissionDenied {
            capability: required.to_string(),
        });
    }

    Ok(next.run(req).await)
}
