//! Shared test utilities.
//!
//! This module provides helpers for setting up in-memory test databases and
//! seeding gate settings and landing documents with sensible defaults.

use crate::{
    core::{
        documents,
        settings::{
            COMING_SOON_KEY, LANDING_DOCUMENT_KEY, MAINTENANCE_ENABLED_KEY, SettingsStore,
        },
    },
    entities::{DocumentStatus, document},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a landing document whose body equals its title.
///
/// # Arguments
/// * `db` - Database connection
/// * `title` - Document title, also used as the body
/// * `status` - Publication state
pub async fn create_test_document(
    db: &DatabaseConnection,
    title: &str,
    status: DocumentStatus,
) -> Result<document::Model> {
    documents::create_document(db, title, title, status).await
}

/// Writes the two flags and the landing document id directly.
///
/// # Defaults
/// * `launch_date` is left untouched (absent on a fresh database)
pub async fn configure_gate(
    db: &DatabaseConnection,
    maintenance: bool,
    coming_soon: bool,
    landing_document_id: i64,
) -> Result<()> {
    let flag = |on: bool| if on { "1" } else { "0" };
    db.set_setting(MAINTENANCE_ENABLED_KEY, flag(maintenance)).await?;
    db.set_setting(COMING_SOON_KEY, flag(coming_soon)).await?;
    db.set_setting(LANDING_DOCUMENT_KEY, &landing_document_id.to_string())
        .await?;
    Ok(())
}
