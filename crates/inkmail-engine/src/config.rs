//! Render configuration

use serde::Deserialize;
use url::Url;

use crate::tracking::TrackingUrls;
use crate::ConfigError;

/// Head style used when the master template does not bring its own
pub const DEFAULT_HEAD_CSS: &str = "html,body,p,div{font-family:Verdana,Arial;font-size:11px;}";

/// Site-wide rendering settings
///
/// Loaded from TOML; every key is optional:
///
/// ```toml
/// website_url = "https://example.com"
/// pixel_path = "/s.gif"
/// editor_link_prefix = "/umbraco/"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Absolute site URL without trailing slash, prefixed to relative URLs
    pub website_url: String,
    /// Master template marker replaced by the body
    pub content_marker: String,
    /// Placeholder replaced by the signed web version URL
    pub web_version_marker: String,
    /// Path of the tracking pixel below `website_url`
    pub pixel_path: String,
    /// Path the rich-text editor puts in front of tag tokens in links
    pub editor_link_prefix: Option<String>,
    /// CSS for the default `<style>` head element; empty disables it
    pub default_head_css: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            website_url: "http://localhost".to_string(),
            content_marker: inkmail_template::DEFAULT_CONTENT_MARKER.to_string(),
            web_version_marker: "[#webversion#]".to_string(),
            pixel_path: "/s.gif".to_string(),
            editor_link_prefix: Some("/umbraco/".to_string()),
            default_head_css: DEFAULT_HEAD_CSS.to_string(),
        }
    }
}

impl RenderConfig {
    /// Default settings for a site
    pub fn new(website_url: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &'static str| ConfigError::InvalidWebsiteUrl {
            url: self.website_url.clone(),
            reason,
        };

        let parsed = Url::parse(&self.website_url).map_err(|_| invalid("not an absolute URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if self.website_url.ends_with('/') {
            return Err(invalid("must not end with '/'"));
        }
        if !self.pixel_path.starts_with('/') {
            return Err(ConfigError::InvalidPixelPath(self.pixel_path.clone()));
        }
        if self.content_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("content_marker"));
        }
        if self.web_version_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("web_version_marker"));
        }
        Ok(())
    }

    /// Endpoints used by the tracking injector
    pub fn tracking_urls(&self) -> TrackingUrls {
        TrackingUrls {
            base_url: self.website_url.clone(),
            pixel_path: self.pixel_path.clone(),
            web_version_marker: self.web_version_marker.clone(),
        }
    }

    /// `<style>` element for the default head style
    pub fn default_head_markup(&self) -> String {
        if self.default_head_css.trim().is_empty() {
            String::new()
        } else {
            format!("<style>{}</style>", self.default_head_css)
        }
    }
}

/// Per-render tracking state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Statistics collection enabled for this email
    pub enabled: bool,
    /// Predicted id of the log entry for this email
    pub tracking_id: Option<String>,
    /// Signed token authorizing the web version link
    pub web_version_token: Option<String>,
}

impl TrackingConfig {
    /// No click tracking, no pixel
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(tracking_id: impl Into<String>, web_version_token: Option<String>) -> Self {
        Self {
            enabled: true,
            tracking_id: Some(tracking_id.into()),
            web_version_token,
        }
    }

    /// Tracking id when click tracking applies
    pub fn active_id(&self) -> Option<&str> {
        self.tracking_id.as_deref().filter(|_| self.enabled)
    }
}
