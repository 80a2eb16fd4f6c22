//! Admin surface: the settings form, the mode status, and minimal landing
//! document management. Every route requires the configured capability.

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AppState, middleware::require_capability};
use crate::{
    core::{
        access::Caller,
        documents::{self, ContentStore},
        gate::{Mode, resolve_mode},
        render::render_settings_form,
        settings::{self, GateSettings, SettingsInput},
    },
    entities::{DocumentStatus, document},
    errors::Result,
};

/// Routes mounted under the admin prefix.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/settings", get(settings_page).post(save_settings))
        .route("/status", get(status))
        .route("/documents", get(list_documents).post(create_document))
        .route("/documents/:id/status", post(update_document_status))
        .route_layer(from_fn_with_state(state, require_capability))
}

#[derive(Debug, Default, Deserialize)]
struct SettingsPageQuery {
    updated: Option<String>,
}

async fn settings_page(
    State(state): State<AppState>,
    Query(query): Query<SettingsPageQuery>,
) -> Result<Html<String>> {
    let action = state.config.gate.admin_url("settings");
    let updated = query.updated.as_deref() == Some("true");
    let page = render_settings_form(&state.renderer, &state.db, &state.db, &action, updated).await?;
    Ok(Html(page))
}

async fn save_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let input = SettingsInput::from_pairs(pairs);
    settings::save_settings(&state.db, &input).await?;
    info!("Settings updated by {:?}", caller.name());
    Ok(Redirect::to(&state.config.gate.admin_url("settings?updated=true")))
}

#[derive(Debug, Serialize)]
struct StatusView {
    mode: Mode,
    notice: Option<&'static str>,
    settings: GateSettings,
    settings_url: String,
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusView>> {
    let settings = GateSettings::load(&state.db).await?;
    let mode = resolve_mode(&settings);
    Ok(Json(StatusView {
        mode,
        notice: mode.notice(),
        settings,
        settings_url: state.config.gate.admin_url("settings"),
    }))
}

async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<document::Model>>> {
    let docs = state
        .db
        .list_documents(document::LANDING_DOCUMENT_TYPE, None)
        .await?;
    Ok(Json(docs))
}

#[derive(Debug, Deserialize)]
struct NewDocument {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default = "draft")]
    status: DocumentStatus,
}

const fn draft() -> DocumentStatus {
    DocumentStatus::Draft
}

async fn create_document(
    State(state): State<AppState>,
    Json(new): Json<NewDocument>,
) -> Result<impl IntoResponse> {
    let created = documents::create_document(&state.db, &new.title, &new.body, new.status).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: DocumentStatus,
}

async fn update_document_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<document::Model>> {
    let updated = documents::set_document_status(&state.db, id, change.status).await?;
    Ok(Json(updated))
}
