//! inkmail CSS Inliner
//!
//! Turns a free-text stylesheet into inline `style` attributes, reproducing
//! specificity, source order and `!important` without a browser engine, then
//! mirrors table styling into legacy attributes.

mod backfill;
mod cascade;
mod parser;
mod selectors;
mod style;

use inkmail_dom::Document;

pub use backfill::{backfill_legacy_attributes, strip_important};
pub use cascade::CssInliner;
pub use parser::CssParser;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    CompoundSelectorEngine, PseudoClass, SelectorEngine,
};
pub use style::{ElementStyle, StyleDeclaration};

/// Parse a stylesheet
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    CssParser::new().parse(css)
}

/// Inline `css` into the document with the default selector engine
pub fn inline_css<'a>(doc: &'a mut Document, css: &str) -> &'a mut Document {
    CssInliner::new().inline(doc, css);
    doc
}

/// Rules extracted from one stylesheet, in source order
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// One rule per accepted selector of a selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    /// Declaration text with double quotes turned into single quotes
    pub declarations: String,
    pub specificity: u32,
    pub source_order: usize,
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector in {0:?}")]
    Empty(String),

    #[error("Unexpected {character:?} in selector {selector:?}")]
    UnexpectedCharacter { selector: String, character: char },

    #[error("Unsupported pseudo-class :{0}")]
    UnsupportedPseudoClass(String),

    #[error("Unsupported attribute selector in {0:?}")]
    UnsupportedAttribute(String),
}

/// CSS inlining error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("DOM update failed: {0}")]
    Dom(#[from] inkmail_dom::DomError),
}
