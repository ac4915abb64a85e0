//! inkmail Template
//!
//! Text-level stages of the render pipeline: `[#tag#]` substitution,
//! conditional blocks, subject cleanup and master template composition.

mod composer;
mod tags;

pub use composer::{
    compose_body, wrap_document, CssMode, MasterTemplate, DEFAULT_CONTENT_MARKER, ENVELOPE_DOCTYPE,
};
pub use tags::{
    evaluate_conditionals, render_text, sanitize_subject, substitute_tags, Tag, TAG_PREFIX,
    TAG_SUFFIX,
};

/// Tag construction error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Tag name is empty")]
    EmptyName,
}
