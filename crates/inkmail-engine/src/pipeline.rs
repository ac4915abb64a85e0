//! Render pipeline
//!
//! ```text
//! raw template
//!   → compose into master → strip editor prefixes → tags & conditionals
//!   → parse → links & assets → inline CSS → backfill
//!   → serialize → absolutize markup → tracking
//! ```

use inkmail_css::{backfill_legacy_attributes, CssInliner};
use inkmail_template::{compose_body, render_text, CssMode, MasterTemplate, Tag};

use crate::collaborators::ContentLinkResolver;
use crate::config::{RenderConfig, TrackingConfig};
use crate::links::{absolutize_markup, rewrite_links_and_assets, strip_editor_prefix};
use crate::tracking::inject_tracking;

/// Everything a render needs besides the template and tags
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    pub tracking: &'a TrackingConfig,
    pub resolver: &'a dyn ContentLinkResolver,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a RenderConfig,
        tracking: &'a TrackingConfig,
        resolver: &'a dyn ContentLinkResolver,
    ) -> Self {
        Self {
            config,
            tracking,
            resolver,
        }
    }
}

/// Render an email body. An empty template renders to an empty string.
pub fn render_email_body(
    raw_template: &str,
    master: Option<&MasterTemplate>,
    tags: &[Tag],
    ctx: &RenderContext<'_>,
) -> String {
    if raw_template.is_empty() {
        return String::new();
    }
    let config = ctx.config;

    let composed = compose_body(
        raw_template,
        master.map(|m| m.body_markup.as_str()),
        &config.content_marker,
    );
    let composed = match config.editor_link_prefix.as_deref() {
        Some(prefix) => strip_editor_prefix(&composed, prefix),
        None => composed,
    };
    let text = render_text(&composed, tags);

    let mut doc = inkmail_html::parse(&text);
    rewrite_links_and_assets(
        &mut doc,
        ctx.tracking.active_id(),
        &config.website_url,
        ctx.resolver,
    );

    if let Some(CssMode::Inline(css)) = master.map(MasterTemplate::css_mode) {
        CssInliner::new().inline(&mut doc, css);
        backfill_legacy_attributes(&mut doc);
    }

    let html = absolutize_markup(&inkmail_html::serialize(&doc), &config.website_url);

    match ctx.tracking.tracking_id.as_deref() {
        Some(id) => inject_tracking(
            &html,
            id,
            ctx.tracking.enabled,
            ctx.tracking.web_version_token.as_deref().unwrap_or_default(),
            &config.tracking_urls(),
        ),
        None => {
            tracing::debug!("No tracking id, skipping tracking injection");
            html
        }
    }
}

/// `<head>` markup of the finished document: the master template's style
/// block when inlining is disabled, otherwise the configured default style
pub fn head_markup(master: Option<&MasterTemplate>, config: &RenderConfig) -> String {
    match master.map(MasterTemplate::css_mode) {
        Some(mode @ CssMode::StyleBlock(_)) => mode.style_element().unwrap_or_default(),
        _ => config.default_head_markup(),
    }
}
