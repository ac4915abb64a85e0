//! Email renderer facade
//!
//! Gathers the master template, tracking id and web version token from the
//! host's collaborators and runs the pipeline. Collaborator failures are
//! logged and degrade the email: no layout, no tracking, no token.

use std::sync::Arc;

use inkmail_template::{render_text, sanitize_subject, wrap_document, MasterTemplate, Tag};

use crate::collaborators::{
    ContentLinkResolver, SigningService, StaticTemplateSource, TemplateSource, TrackingIdAllocator,
};
use crate::config::{RenderConfig, TrackingConfig};
use crate::pipeline::{head_markup, render_email_body, RenderContext};

/// Output of one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Pipeline output
    pub body: String,
    /// Complete document handed to the transport
    pub html: String,
    /// Log id the email was rendered for, when tracking applied
    pub tracking_id: Option<String>,
}

struct Tracking {
    allocator: Arc<dyn TrackingIdAllocator + Send + Sync>,
    signer: Arc<dyn SigningService + Send + Sync>,
}

/// Renders emails for one site
pub struct EmailRenderer {
    config: RenderConfig,
    templates: Arc<dyn TemplateSource + Send + Sync>,
    links: Arc<dyn ContentLinkResolver + Send + Sync>,
    tracking: Option<Tracking>,
}

impl EmailRenderer {
    pub fn new(
        config: RenderConfig,
        templates: Arc<dyn TemplateSource + Send + Sync>,
        links: Arc<dyn ContentLinkResolver + Send + Sync>,
    ) -> Self {
        Self {
            config,
            templates,
            links,
            tracking: None,
        }
    }

    /// Renderer without master template or tracking
    pub fn without_layout(config: RenderConfig, links: Arc<dyn ContentLinkResolver + Send + Sync>) -> Self {
        Self::new(config, Arc::new(StaticTemplateSource::default()), links)
    }

    /// Builder: enable view and click tracking
    pub fn with_tracking(
        mut self,
        allocator: Arc<dyn TrackingIdAllocator + Send + Sync>,
        signer: Arc<dyn SigningService + Send + Sync>,
    ) -> Self {
        self.tracking = Some(Tracking { allocator, signer });
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render an HTML email
    pub fn render(&self, raw_template: &str, tags: &[Tag]) -> RenderedEmail {
        let master = self.master_template();
        let tracking = self.tracking_config();

        let ctx = RenderContext::new(&self.config, &tracking, self.links.as_ref());
        let body = render_email_body(raw_template, master.as_ref(), tags, &ctx);
        let html = if body.is_empty() {
            String::new()
        } else {
            wrap_document(&body, &head_markup(master.as_ref(), &self.config))
        };

        RenderedEmail {
            body,
            html,
            tracking_id: tracking.tracking_id,
        }
    }

    /// Render a plain text part, sender or recipient address
    pub fn render_text(&self, text: &str, tags: &[Tag]) -> String {
        render_text(text, tags)
    }

    /// Render a subject line
    pub fn render_subject(&self, subject: &str, tags: &[Tag]) -> String {
        sanitize_subject(&render_text(subject, tags))
    }

    fn master_template(&self) -> Option<MasterTemplate> {
        match self.templates.master_template() {
            Ok(master) => master,
            Err(e) => {
                tracing::warn!("Master template unavailable, rendering without layout: {}", e);
                None
            }
        }
    }

    fn tracking_config(&self) -> TrackingConfig {
        let Some(tracking) = &self.tracking else {
            return TrackingConfig::disabled();
        };

        let tracking_id = match tracking.allocator.predict_next_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("No tracking id, rendering without tracking: {}", e);
                return TrackingConfig::disabled();
            }
        };
        let token = match tracking.signer.sign(&tracking_id) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Web version token unavailable: {}", e);
                None
            }
        };
        TrackingConfig::enabled(tracking_id, token)
    }
}
