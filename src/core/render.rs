//! HTML rendering for the landing page, the fallback message and the
//! settings form, using embedded Handlebars templates.

use crate::{
    config::app::SiteConfig,
    core::{
        content::ContentPipeline,
        documents::{ContentStore, published_landing_documents},
        gate::resolve_mode,
        settings::{
            COMING_SOON_KEY, GateSettings, LANDING_DOCUMENT_KEY, LAUNCH_DATE_KEY,
            MAINTENANCE_ENABLED_KEY, SettingsStore,
        },
    },
    entities::document,
    errors::Result,
};
use handlebars::Handlebars;
use serde::Serialize;

/// Title of the generic fallback page.
pub const FALLBACK_TITLE: &str = "Site Unavailable";
/// Body of the generic fallback page.
pub const FALLBACK_MESSAGE: &str = "Our site is currently unavailable. Please check back later.";
/// Title used when rejecting API calls.
pub const API_BLOCK_TITLE: &str = "Maintenance Mode";
/// Message used when rejecting API calls.
pub const API_BLOCK_MESSAGE: &str =
    "REST API access is restricted while the site is under maintenance.";

const LANDING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{language}}">
<head>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="Content-Type" content="text/html; charset={{charset}}">
<title>{{site_name}}</title>
{{#if stylesheet}}<link rel="stylesheet" href="{{stylesheet}}">
{{/if}}{{#each head_html}}{{{this}}}
{{/each}}</head>
<body>
<div class="maintenance-mode-content">
{{{content}}}
</div>
{{#each footer_html}}{{{this}}}
{{/each}}</body>
</html>
"#;

const MESSAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{language}}">
<head>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="Content-Type" content="text/html; charset={{charset}}">
<title>{{title}}</title>
</head>
<body id="error-page">
<div class="gate-message"><p>{{message}}</p></div>
</body>
</html>
"#;

const SETTINGS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{language}}">
<head>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="Content-Type" content="text/html; charset={{charset}}">
<title>Maintenance Mode Settings</title>
</head>
<body>
<div class="wrap">
<h1>Maintenance Mode Settings</h1>
{{#if notice}}<div class="notice notice-warning"><p>{{notice}}</p></div>
{{/if}}{{#if updated}}<div class="notice notice-success"><p>Settings saved.</p></div>
{{/if}}<hr />
<form method="post" action="{{action}}">
<h2>Maintenance Mode Settings</h2>
<p>Configure the maintenance mode settings below.</p>
<table class="form-table">
<tr>
<th scope="row">Enable Maintenance Mode</th>
<td><input type="hidden" name="{{maintenance_key}}" value="0"><input type="checkbox" name="{{maintenance_key}}" value="1"{{#if maintenance_checked}} checked="checked"{{/if}}></td>
</tr>
<tr>
<th scope="row">Enable Coming Soon Mode</th>
<td><input type="hidden" name="{{coming_soon_key}}" value="0"><input type="checkbox" name="{{coming_soon_key}}" value="1"{{#if coming_soon_checked}} checked="checked"{{/if}}></td>
</tr>
<tr>
<th scope="row">Launch Date</th>
<td><input type="date" name="{{date_key}}" value="{{launch_date}}"></td>
</tr>
<tr>
<th scope="row">Maintenance Mode Page</th>
<td><select name="{{document_key}}">
{{#each documents}}<option value="{{id}}"{{#if selected}} selected="selected"{{/if}}>{{title}}</option>
{{/each}}</select></td>
</tr>
</table>
<p class="submit"><input type="submit" name="submit" class="button button-primary" value="Save Changes"></p>
</form>
</div>
</body>
</html>
"#;

#[derive(Serialize)]
struct LandingView<'a> {
    language: &'a str,
    charset: &'a str,
    site_name: &'a str,
    stylesheet: Option<&'a str>,
    head_html: &'a [String],
    footer_html: &'a [String],
    content: String,
}

#[derive(Serialize)]
struct MessageView<'a> {
    language: &'a str,
    charset: &'a str,
    title: &'a str,
    message: &'a str,
}

/// One entry of the landing document picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOption {
    /// Document id submitted by the form
    pub id: i64,
    /// Label shown to the operator
    pub title: String,
    /// Whether this is the configured document
    pub selected: bool,
}

/// Everything the settings form displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsFormView {
    /// URL the form posts to
    pub action: String,
    /// Active-mode notice, if a mode is on
    pub notice: Option<&'static str>,
    /// Show the "settings saved" confirmation
    pub updated: bool,
    /// Maintenance checkbox state
    pub maintenance_checked: bool,
    /// Coming-soon checkbox state
    pub coming_soon_checked: bool,
    /// Stored launch date, empty when unset
    pub launch_date: String,
    /// Published landing documents
    pub documents: Vec<DocumentOption>,
}

impl SettingsFormView {
    /// Builds the view from current settings and the published documents.
    #[must_use]
    pub fn new(
        settings: &GateSettings,
        documents: &[document::Model],
        action: &str,
        updated: bool,
    ) -> Self {
        Self {
            action: action.to_string(),
            notice: resolve_mode(settings).notice(),
            updated,
            maintenance_checked: settings.maintenance_enabled,
            coming_soon_checked: settings.coming_soon_enabled,
            launch_date: settings.launch_date.clone().unwrap_or_default(),
            documents: documents
                .iter()
                .map(|doc| DocumentOption {
                    id: doc.id,
                    title: doc.title.clone(),
                    selected: doc.id == settings.landing_document_id,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct SettingsPage<'a> {
    language: &'a str,
    charset: &'a str,
    maintenance_key: &'static str,
    coming_soon_key: &'static str,
    date_key: &'static str,
    document_key: &'static str,
    #[serde(flatten)]
    form: &'a SettingsFormView,
}

/// Renders every page the gate emits.
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
    site: SiteConfig,
    pipeline: ContentPipeline,
}

impl PageRenderer {
    /// Registers the embedded templates.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Template`] if a template fails to parse.
    pub fn new(site: SiteConfig, pipeline: ContentPipeline) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("landing", LANDING_TEMPLATE)?;
        handlebars.register_template_string("message", MESSAGE_TEMPLATE)?;
        handlebars.register_template_string("settings", SETTINGS_TEMPLATE)?;

        Ok(Self {
            handlebars,
            site,
            pipeline,
        })
    }

    /// Full HTML page wrapping the filtered document body.
    pub fn landing_page(&self, document: &document::Model) -> Result<String> {
        let view = LandingView {
            language: &self.site.language,
            charset: &self.site.charset,
            site_name: &self.site.name,
            stylesheet: self.site.stylesheet.as_deref(),
            head_html: &self.site.head_html,
            footer_html: &self.site.footer_html,
            content: self.pipeline.render(&document.body),
        };
        Ok(self.handlebars.render("landing", &view)?)
    }

    /// Minimal page carrying a title and a message.
    pub fn message_page(&self, title: &str, message: &str) -> Result<String> {
        let view = MessageView {
            language: &self.site.language,
            charset: &self.site.charset,
            title,
            message,
        };
        Ok(self.handlebars.render("message", &view)?)
    }

    /// The generic "site unavailable" page.
    pub fn fallback_page(&self) -> Result<String> {
        self.message_page(FALLBACK_TITLE, FALLBACK_MESSAGE)
    }

    /// The settings form.
    pub fn settings_page(&self, form: &SettingsFormView) -> Result<String> {
        let page = SettingsPage {
            language: &self.site.language,
            charset: &self.site.charset,
            maintenance_key: MAINTENANCE_ENABLED_KEY,
            coming_soon_key: COMING_SOON_KEY,
            date_key: LAUNCH_DATE_KEY,
            document_key: LANDING_DOCUMENT_KEY,
            form,
        };
        Ok(self.handlebars.render("settings", &page)?)
    }
}

/// Loads the current settings and published documents and renders the form.
///
/// # Arguments
/// * `renderer` - Page renderer holding the templates
/// * `settings_store` - Current settings
/// * `content` - Source of the selectable landing documents
/// * `action` - URL the form posts to
/// * `updated` - Show the "Settings updated" notice
///
/// # Errors
/// Returns an error if a store read fails or the template cannot render.
pub async fn render_settings_form<S, C>(
    renderer: &PageRenderer,
    settings_store: &S,
    content: &C,
    action: &str,
    updated: bool,
) -> Result<String>
where
    S: SettingsStore + ?Sized,
    C: ContentStore + ?Sized,
{
    let settings = GateSettings::load(settings_store).await?;
    let documents = published_landing_documents(content).await?;
    renderer.settings_page(&SettingsFormView::new(&settings, &documents, action, updated))
}
