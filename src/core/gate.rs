//! Access gate decisions.
//!
//! Given the persisted settings, the caller and the kind of request, decide
//! whether the request proceeds normally or is answered with the landing
//! document, a fallback message, or an API rejection.
//!
//! The decision itself ([`decide`]) is pure. [`intercept_request`] loads the
//! settings, fetches the landing document only when it can matter, and
//! delegates to it.

use crate::{
    core::{
        documents::ContentStore,
        settings::{GateSettings, SettingsStore},
    },
    entities::document,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Status used for landing and fallback responses in maintenance mode.
pub const MAINTENANCE_STATUS: u16 = 503;
/// Status used for landing and fallback responses in coming-soon mode.
pub const COMING_SOON_STATUS: u16 = 200;

/// Resolved gating state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No gating
    Off,
    /// Site is down for maintenance, responses are 503
    Maintenance,
    /// Site has not launched yet, responses are 200
    ComingSoon,
}

impl Mode {
    /// Whether anonymous requests may be intercepted.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Status code for landing and fallback responses in this mode.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Maintenance => MAINTENANCE_STATUS,
            Self::ComingSoon | Self::Off => COMING_SOON_STATUS,
        }
    }

    /// Machine name, as used in headers and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Maintenance => "maintenance",
            Self::ComingSoon => "coming_soon",
        }
    }

    /// Notice shown to operators while the mode is active.
    #[must_use]
    pub const fn notice(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Maintenance => Some("MAINTENANCE MODE IS ACTIVE"),
            Self::ComingSoon => Some("COMING SOON MODE IS ACTIVE"),
        }
    }
}

/// Maintenance wins when both flags are set.
#[must_use]
pub const fn resolve_mode(settings: &GateSettings) -> Mode {
    if settings.maintenance_enabled {
        Mode::Maintenance
    } else if settings.coming_soon_enabled {
        Mode::ComingSoon
    } else {
        Mode::Off
    }
}

/// What an inbound request is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Ordinary page request
    Page,
    /// Programmatic API call
    Api,
    /// Operator admin screen
    Admin,
}

/// Policy knobs the decision depends on besides the settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatePolicy {
    /// Status for anonymous API calls rejected during maintenance
    pub api_block_status: u16,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            api_block_status: MAINTENANCE_STATUS,
        }
    }
}

/// Outcome for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue with normal handling
    PassThrough,
    /// Serve the landing document as a full page and stop
    Landing {
        /// Response status
        status: u16,
        /// Published landing document
        document: document::Model,
    },
    /// Reject the API call before it is handled
    RejectApi {
        /// Response status
        status: u16,
    },
    /// Serve the generic "site unavailable" message and stop
    Fallback {
        /// Response status
        status: u16,
    },
}

impl GateDecision {
    /// Whether normal handling is skipped.
    #[must_use]
    pub const fn intercepts(&self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

/// Decision plus the mode resolved from the flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interception {
    /// Mode resolved from the flags alone
    pub mode: Mode,
    /// What to do with the request
    pub decision: GateDecision,
}

fn parse_launch_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
}

/// Whether the configured launch moment has been reached.
///
/// Unparseable dates count as not launched, so gating stays in force.
#[must_use]
pub fn launch_has_passed(launch_date: &str, now: DateTime<Utc>) -> bool {
    match parse_launch_date(launch_date.trim()) {
        Some(launch) => launch <= now,
        None => {
            warn!("Ignoring unparseable launch date {:?}", launch_date);
            false
        }
    }
}

/// The mode that applies to this particular request.
///
/// `Off` for signed-in callers, admin screens, and once the launch date has
/// passed; otherwise the mode resolved from the flags.
#[must_use]
pub fn effective_mode(
    settings: &GateSettings,
    caller_is_authenticated: bool,
    kind: RequestKind,
    now: DateTime<Utc>,
) -> Mode {
    let mode = resolve_mode(settings);
    if caller_is_authenticated || kind == RequestKind::Admin || !mode.is_active() {
        return Mode::Off;
    }
    if settings
        .launch_date
        .as_deref()
        .is_some_and(|date| launch_has_passed(date, now))
    {
        debug!("Launch date reached, gate bypassed");
        return Mode::Off;
    }
    mode
}

/// Decides how to answer a request for which `mode` applies.
///
/// `document` is the configured landing document, if one was found; it is
/// only used for page requests and only when published.
#[must_use]
pub fn decide(
    mode: Mode,
    kind: RequestKind,
    policy: &GatePolicy,
    document: Option<document::Model>,
) -> GateDecision {
    match (mode, kind) {
        (Mode::Off, _) | (_, RequestKind::Admin) | (Mode::ComingSoon, RequestKind::Api) => {
            GateDecision::PassThrough
        }
        (Mode::Maintenance, RequestKind::Api) => GateDecision::RejectApi {
            status: policy.api_block_status,
        },
        (_, RequestKind::Page) => match document.filter(document::Model::is_published) {
            Some(document) => GateDecision::Landing {
                status: mode.status_code(),
                document,
            },
            None => GateDecision::Fallback {
                status: mode.status_code(),
            },
        },
    }
}

/// Loads settings and decides how to answer one request.
///
/// The landing document is only fetched when a page request is actually
/// gated, so pass-through traffic costs a single settings read.
///
/// # Arguments
/// * `settings_store` - Source of the four gate settings
/// * `content` - Source of the landing document
/// * `policy` - Status used for rejected API calls
/// * `caller_is_authenticated` - Signed-in callers are never gated
/// * `kind` - Page, API or admin request
/// * `now` - Compared against the launch date
///
/// # Returns
/// The resolved mode (reported even for callers that pass) and the decision.
///
/// # Errors
/// Returns an error if either store fails; the caller must not fall back to
/// serving the site.
#[instrument(skip(settings_store, content, policy))]
pub async fn intercept_request<S, C>(
    settings_store: &S,
    content: &C,
    policy: &GatePolicy,
    caller_is_authenticated: bool,
    kind: RequestKind,
    now: DateTime<Utc>,
) -> Result<Interception>
where
    S: SettingsStore + ?Sized,
    C: ContentStore + ?Sized,
{
    let settings = GateSettings::load(settings_store).await?;
    let mode = resolve_mode(&settings);
    let applied = effective_mode(&settings, caller_is_authenticated, kind, now);

    let document = if applied.is_active()
        && kind == RequestKind::Page
        && settings.landing_document_id > 0
    {
        content.fetch_document(settings.landing_document_id).await?
    } else {
        None
    };

    let decision = decide(applied, kind, policy, document);
    debug!("Gate mode {:?} applied {:?}: {:?}", mode, applied, decision);
    Ok(Interception { mode, decision })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::settings::{
            COMING_SOON_KEY, LANDING_DOCUMENT_KEY, LAUNCH_DATE_KEY, MAINTENANCE_ENABLED_KEY,
        },
        entities::DocumentStatus,
        test_utils::{configure_gate, create_test_document, init_test_tracing, setup_test_db},
    };
    use chrono::{Duration, TimeZone};

    fn settings(maintenance: bool, coming_soon: bool) -> GateSettings {
        GateSettings {
            maintenance_enabled: maintenance,
            coming_soon_enabled: coming_soon,
            launch_date: None,
            landing_document_id: 0,
        }
    }

    fn doc(status: DocumentStatus) -> document::Model {
        let now = Utc::now().naive_utc();
        document::Model {
            id: 7,
            doc_type: document::LANDING_DOCUMENT_TYPE.to_string(),
            title: "Landing".to_string(),
            body: "Back soon".to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_mode() {
        assert_eq!(resolve_mode(&settings(false, false)), Mode::Off);
        assert_eq!(resolve_mode(&settings(true, false)), Mode::Maintenance);
        assert_eq!(resolve_mode(&settings(false, true)), Mode::ComingSoon);
        assert_eq!(resolve_mode(&settings(true, true)), Mode::Maintenance);
    }

    #[test]
    fn test_authenticated_callers_always_pass() {
        for (m, c) in [(false, false), (true, false), (false, true), (true, true)] {
            for kind in [RequestKind::Page, RequestKind::Api, RequestKind::Admin] {
                assert_eq!(effective_mode(&settings(m, c), true, kind, noon()), Mode::Off);
            }
        }
    }

    #[test]
    fn test_admin_requests_are_never_gated() {
        let mode = effective_mode(&settings(true, false), false, RequestKind::Admin, noon());
        assert_eq!(mode, Mode::Off);
        let decision = decide(Mode::Maintenance, RequestKind::Admin, &GatePolicy::default(), None);
        assert_eq!(decision, GateDecision::PassThrough);
    }

    #[test]
    fn test_off_passes_through() {
        let mode = effective_mode(&settings(false, false), false, RequestKind::Page, noon());
        assert_eq!(decide(mode, RequestKind::Page, &GatePolicy::default(), None), GateDecision::PassThrough);
    }

    #[test]
    fn test_landing_status_per_mode() {
        let policy = GatePolicy::default();
        let published = doc(DocumentStatus::Publish);

        let maintenance = decide(Mode::Maintenance, RequestKind::Page, &policy, Some(published.clone()));
        assert_eq!(
            maintenance,
            GateDecision::Landing { status: 503, document: published.clone() }
        );

        let coming_soon = decide(Mode::ComingSoon, RequestKind::Page, &policy, Some(published.clone()));
        assert_eq!(coming_soon, GateDecision::Landing { status: 200, document: published });
    }

    #[test]
    fn test_unpublished_document_falls_back() {
        let policy = GatePolicy::default();
        for status in [DocumentStatus::Draft, DocumentStatus::Pending, DocumentStatus::Private, DocumentStatus::Trash] {
            assert_eq!(
                decide(Mode::Maintenance, RequestKind::Page, &policy, Some(doc(status))),
                GateDecision::Fallback { status: 503 }
            );
            assert_eq!(
                decide(Mode::ComingSoon, RequestKind::Page, &policy, Some(doc(status))),
                GateDecision::Fallback { status: 200 }
            );
        }
        assert_eq!(
            decide(Mode::ComingSoon, RequestKind::Page, &policy, None),
            GateDecision::Fallback { status: 200 }
        );
    }

    #[test]
    fn test_api_rejected_only_in_maintenance() {
        let policy = GatePolicy::default();
        let published = Some(doc(DocumentStatus::Publish));

        assert_eq!(
            decide(Mode::Maintenance, RequestKind::Api, &policy, published.clone()),
            GateDecision::RejectApi { status: 503 }
        );
        assert_eq!(
            decide(Mode::Maintenance, RequestKind::Api, &policy, None),
            GateDecision::RejectApi { status: 503 }
        );
        assert_eq!(
            decide(Mode::ComingSoon, RequestKind::Api, &policy, published),
            GateDecision::PassThrough
        );

        let forbidding = GatePolicy { api_block_status: 403 };
        assert_eq!(
            decide(Mode::Maintenance, RequestKind::Api, &forbidding, None),
            GateDecision::RejectApi { status: 403 }
        );
    }

    #[test]
    fn test_launch_date_parsing() {
        let now = noon();
        assert!(launch_has_passed("2026-03-15", now));
        assert!(launch_has_passed("2026-03-14", now));
        assert!(!launch_has_passed("2026-03-16", now));
        assert!(launch_has_passed("2026-03-15T12:00", now));
        assert!(!launch_has_passed("2026-03-15T12:00:01", now));
        assert!(launch_has_passed("2026-03-15T13:00:00+02:00", now));
        assert!(!launch_has_passed("next tuesday", now));
        assert!(!launch_has_passed("", now));
    }

    #[test]
    fn test_past_launch_date_bypasses_gate() {
        let mut gated = settings(true, true);
        gated.launch_date = Some((noon() - Duration::days(1)).format("%Y-%m-%d").to_string());
        assert_eq!(effective_mode(&gated, false, RequestKind::Page, noon()), Mode::Off);
        assert_eq!(effective_mode(&gated, false, RequestKind::Api, noon()), Mode::Off);

        gated.launch_date = Some("2099-01-01".to_string());
        assert_eq!(effective_mode(&gated, false, RequestKind::Page, noon()), Mode::Maintenance);

        gated.launch_date = Some("soon".to_string());
        assert_eq!(effective_mode(&gated, false, RequestKind::Page, noon()), Mode::Maintenance);
    }

    #[test]
    fn test_mode_notice() {
        assert_eq!(Mode::Off.notice(), None);
        assert_eq!(Mode::Maintenance.notice(), Some("MAINTENANCE MODE IS ACTIVE"));
        assert_eq!(Mode::ComingSoon.notice(), Some("COMING SOON MODE IS ACTIVE"));
        assert_eq!(Mode::ComingSoon.as_str(), "coming_soon");
    }

    #[tokio::test]
    async fn test_intercept_maintenance_with_published_document() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let landing = create_test_document(&db, "Back soon", DocumentStatus::Publish).await?;
        configure_gate(&db, true, false, landing.id).await?;

        let outcome = intercept_request(&db, &db, &GatePolicy::default(), false, RequestKind::Page, Utc::now()).await?;
        assert_eq!(outcome.mode, Mode::Maintenance);
        match outcome.decision {
            GateDecision::Landing { status, document } => {
                assert_eq!(status, 503);
                assert_eq!(document.id, landing.id);
            }
            other => panic!("expected landing page, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_intercept_coming_soon_without_document() -> Result<()> {
        let db = setup_test_db().await?;
        configure_gate(&db, false, true, 0).await?;

        let outcome = intercept_request(&db, &db, &GatePolicy::default(), false, RequestKind::Page, Utc::now()).await?;
        assert_eq!(outcome.mode, Mode::ComingSoon);
        assert_eq!(outcome.decision, GateDecision::Fallback { status: 200 });
        Ok(())
    }

    #[tokio::test]
    async fn test_intercept_missing_document_id() -> Result<()> {
        let db = setup_test_db().await?;
        configure_gate(&db, true, false, 4242).await?;

        let outcome = intercept_request(&db, &db, &GatePolicy::default(), false, RequestKind::Page, Utc::now()).await?;
        assert_eq!(outcome.decision, GateDecision::Fallback { status: 503 });
        Ok(())
    }

    #[tokio::test]
    async fn test_intercept_authenticated_reports_mode_but_passes() -> Result<()> {
        let db = setup_test_db().await?;
        configure_gate(&db, true, true, 0).await?;

        let outcome = intercept_request(&db, &db, &GatePolicy::default(), true, RequestKind::Page, Utc::now()).await?;
        assert_eq!(outcome.mode, Mode::Maintenance);
        assert_eq!(outcome.decision, GateDecision::PassThrough);
        Ok(())
    }

    #[tokio::test]
    async fn test_intercept_reads_raw_settings() -> Result<()> {
        let db = setup_test_db().await?;
        let landing = create_test_document(&db, "Soon", DocumentStatus::Publish).await?;
        db.set_setting(MAINTENANCE_ENABLED_KEY, "0").await?;
        db.set_setting(COMING_SOON_KEY, "1").await?;
        db.set_setting(LAUNCH_DATE_KEY, "2000-01-01").await?;
        db.set_setting(LANDING_DOCUMENT_KEY, &landing.id.to_string()).await?;

        let outcome = intercept_request(&db, &db, &GatePolicy::default(), false, RequestKind::Page, Utc::now()).await?;
        assert_eq!(outcome.mode, Mode::ComingSoon);
        assert_eq!(outcome.decision, GateDecision::PassThrough, "launch date in the past");
        Ok(())
    }
}
