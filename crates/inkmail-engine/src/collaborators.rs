//! Collaborators - services the renderer consumes from the host
//!
//! The CMS, the email log and the signing service live outside this crate.
//! Each failure is reported as a [`CollaboratorError`]; the renderer degrades
//! instead of failing the email.

use std::collections::HashMap;

use inkmail_template::MasterTemplate;

use crate::CollaboratorError;

/// Supplies the master layout of the email being rendered
pub trait TemplateSource {
    fn master_template(&self) -> Result<Option<MasterTemplate>, CollaboratorError>;
}

/// Resolves internal content references (`/{localLink:1234}`) to public URLs
pub trait ContentLinkResolver {
    fn resolve(&self, content_id: u64) -> Result<Option<String>, CollaboratorError>;
}

/// Predicts the log id the email will be stored under
pub trait TrackingIdAllocator {
    fn predict_next_id(&self) -> Result<String, CollaboratorError>;
}

/// Produces the web version authentication token
pub trait SigningService {
    fn sign(&self, payload: &str) -> Result<String, CollaboratorError>;
}

/// Fixed master template (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateSource(pub Option<MasterTemplate>);

impl TemplateSource for StaticTemplateSource {
    fn master_template(&self) -> Result<Option<MasterTemplate>, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// Resolver without any content; every reference stays unresolved
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContentLinks;

impl ContentLinkResolver for NoContentLinks {
    fn resolve(&self, _content_id: u64) -> Result<Option<String>, CollaboratorError> {
        Ok(None)
    }
}

/// In-memory content id to URL table
#[derive(Debug, Clone, Default)]
pub struct ContentLinkMap {
    links: HashMap<u64, String>,
}

impl ContentLinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add one content URL
    pub fn with_link(mut self, content_id: u64, url: impl Into<String>) -> Self {
        self.links.insert(content_id, url.into());
        self
    }
}

impl ContentLinkResolver for ContentLinkMap {
    fn resolve(&self, content_id: u64) -> Result<Option<String>, CollaboratorError> {
        Ok(self.links.get(&content_id).cloned())
    }
}

/// Allocator handing out one preassigned id
#[derive(Debug, Clone)]
pub struct FixedTrackingId(pub String);

impl TrackingIdAllocator for FixedTrackingId {
    fn predict_next_id(&self) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}
