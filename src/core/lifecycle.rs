//! Activation - first-run setup of settings and the default landing page.
//!
//! Activation is idempotent and safe to run on every start: existing
//! settings are never overwritten. The default landing document is only
//! provisioned on the first run of an installation, so an operator who later
//! clears the landing page keeps the fallback message across restarts.

use crate::{
    core::{
        documents,
        settings::{
            ACTIVATED_KEY, DEFAULTS, LANDING_DOCUMENT_KEY, SettingsStore, coerce_int,
            set_setting_if_absent,
        },
    },
    entities::DocumentStatus,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Title of the auto-provisioned landing document.
pub const DEFAULT_LANDING_TITLE: &str = "Maintenance";
/// Body of the auto-provisioned landing document.
pub const DEFAULT_LANDING_BODY: &str = "<h1>We'll be back soon</h1>\n\nOur site is undergoing scheduled maintenance. Thank you for your patience.";

/// What an activation run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Keys that were absent and received their default
    pub initialized: Vec<&'static str>,
    /// Id of the landing document created by this run
    pub provisioned_document: Option<i64>,
    /// Whether this was the first activation of the installation
    pub first_run: bool,
}

impl ActivationReport {
    /// Whether the run wrote anything.
    #[must_use]
    pub fn changed_anything(&self) -> bool {
        self.first_run || !self.initialized.is_empty() || self.provisioned_document.is_some()
    }
}

/// Ensures every setting exists and, on first run, that a landing document
/// is configured.
///
/// # Arguments
/// * `db` - Settings and document store
///
/// # Returns
/// What this run wrote. A second run against the same store reports nothing.
///
/// # Errors
/// Returns an error if reading or writing settings fails, or if the default
/// landing document cannot be created.
#[instrument(skip(db))]
pub async fn activate(db: &DatabaseConnection) -> Result<ActivationReport> {
    let mut report = ActivationReport {
        first_run: db.get_setting(ACTIVATED_KEY).await?.is_none(),
        ..ActivationReport::default()
    };

    for (key, default) in DEFAULTS {
        if set_setting_if_absent(db, key, default).await? {
            info!("Initialized setting {} = {:?}", key, default);
            report.initialized.push(key);
        }
    }

    let configured = coerce_int(&db.get_setting_or(LANDING_DOCUMENT_KEY, "0").await?);
    if report.first_run && configured == 0 {
        let document = documents::create_document(
            db,
            DEFAULT_LANDING_TITLE,
            DEFAULT_LANDING_BODY,
            DocumentStatus::Publish,
        )
        .await?;
        db.set_setting(LANDING_DOCUMENT_KEY, &document.id.to_string())
            .await?;
        info!("Provisioned default landing document {}", document.id);
        report.provisioned_document = Some(document.id);
    }

    if report.first_run {
        let stamp = chrono::Utc::now().naive_utc().to_string();
        set_setting_if_absent(db, ACTIVATED_KEY, &stamp).await?;
        info!("Recorded first activation at {}", stamp);
    }

    Ok(report)
}
