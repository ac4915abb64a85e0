//! inkmail HTML
//!
//! HTML5 parsing built on html5ever, plus the serializer that turns the
//! processed DOM back into the markup handed to the mail transport.

mod parser;
mod serializer;

pub use inkmail_dom::Document;
pub use parser::HtmlParser;
pub use serializer::HtmlSerializer;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Serialize a Document back to markup
pub fn serialize(doc: &Document) -> String {
    HtmlSerializer::new().serialize_document(doc)
}

/// HTML parsing error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM construction failed: {0}")]
    Dom(#[from] inkmail_dom::DomError),
}
