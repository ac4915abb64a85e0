//! inkmail Engine
//!
//! Renders data-driven HTML emails that survive inconsistent mail clients:
//! tags are substituted, the body is composed into its master layout, CSS is
//! inlined, URLs are made absolute and tracking is injected.
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use inkmail_engine::{EmailRenderer, NoContentLinks, RenderConfig, Tag};
//!
//! let renderer = EmailRenderer::without_layout(
//!     RenderConfig::new("https://example.com"),
//!     Arc::new(NoContentLinks),
//! );
//! let email = renderer.render("<p>Hi [#name#]</p>", &[Tag::new("name", "Ann")?]);
//! ```

pub mod collaborators;
mod config;
pub mod links;
mod pipeline;
mod renderer;
pub mod tracking;

pub use collaborators::{
    ContentLinkMap, ContentLinkResolver, FixedTrackingId, NoContentLinks, SigningService,
    StaticTemplateSource, TemplateSource, TrackingIdAllocator,
};
pub use config::{RenderConfig, TrackingConfig, DEFAULT_HEAD_CSS};
pub use pipeline::{head_markup, render_email_body, RenderContext};
pub use renderer::{EmailRenderer, RenderedEmail};
pub use tracking::{inject_tracking, strip_tracking_pixel, TrackingAction, TrackingEvent, TrackingUrls};

// Re-export pipeline crates for advanced usage
pub use inkmail_css as css;
pub use inkmail_dom as dom;
pub use inkmail_html as html;
pub use inkmail_template as template;

pub use inkmail_template::{CssMode, MasterTemplate, Tag, TagError};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failure reported by a collaborator
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{service} unavailable: {message}")]
    Unavailable { service: &'static str, message: String },

    #[error("Collaborator failed: {0}")]
    Other(String),
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid website_url {url:?}: {reason}")]
    InvalidWebsiteUrl { url: String, reason: &'static str },

    #[error("pixel_path {0:?} must start with '/'")]
    InvalidPixelPath(String),

    #[error("{0} must not be empty")]
    EmptyMarker(&'static str),
}

/// Tracking request error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    #[error("Missing mail id")]
    MissingMailId,

    #[error("Invalid mail id {0:?}")]
    InvalidMailId(String),

    #[error("Missing action")]
    MissingAction,

    #[error("Unknown action {0:?}")]
    UnknownAction(String),
}
