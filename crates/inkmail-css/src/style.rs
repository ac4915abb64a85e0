//! Inline style state of one element
//!
//! An [`ElementStyle`] is the ordered declaration list behind a `style`
//! attribute. Order is priority: index 0 is emitted first, and merging inserts
//! at the front or back depending on what is already present.

use std::fmt;

const IMPORTANT: &str = "!important";

/// One `property:value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
    /// Lowercased property name
    pub property: String,
    /// Value without the `!important` marker
    pub value: String,
    pub important: bool,
}

impl StyleDeclaration {
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        Self {
            property: property.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important,
        }
    }

    /// Parse `prop: value [!important]`; `None` when either side is empty
    pub fn parse(text: &str) -> Option<Self> {
        let (property, value) = text.split_once(':')?;
        let property = property.trim();
        let (value, important) = split_important(value);
        if property.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(property, value, important))
    }

    /// Shorthand this longhand belongs to (`padding` for `padding-top`)
    pub fn base_property(&self) -> &str {
        self.property.split('-').next().unwrap_or(&self.property)
    }
}

impl fmt::Display for StyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            f.write_str(IMPORTANT)?;
        }
        Ok(())
    }
}

/// Split a trailing `!important` (any case, optional spaces) off a value
pub(crate) fn split_important(value: &str) -> (&str, bool) {
    let trimmed = value.trim();
    if let Some(bang) = trimmed.rfind('!') {
        let marker = trimmed[bang + 1..].trim();
        if marker.eq_ignore_ascii_case("important") {
            return (trimmed[..bang].trim_end(), true);
        }
    }
    (trimmed, false)
}

/// Ordered declaration list of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementStyle {
    declarations: Vec<StyleDeclaration>,
}

impl ElementStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute. A repeated property keeps its first position;
    /// the later value wins unless the earlier one is important.
    pub fn parse(style: &str) -> Self {
        let mut parsed = Self::new();
        for decl in style.split(';').filter_map(StyleDeclaration::parse) {
            match parsed.position(&decl.property) {
                Some(index) => {
                    let existing = &mut parsed.declarations[index];
                    if !existing.important || decl.important {
                        *existing = decl;
                    }
                }
                None => parsed.declarations.push(decl),
            }
        }
        parsed
    }

    /// Merge one rule declaration into the list.
    ///
    /// - absent property without its base property present: inserted at the front
    /// - absent property with the base present: appended only when important
    ///   and the base is not, otherwise dropped
    /// - present property: replaced only when the new one is important and the
    ///   existing one is not
    pub fn digest(&mut self, decl: StyleDeclaration) {
        if let Some(index) = self.position(&decl.property) {
            let existing = &mut self.declarations[index];
            if !existing.important && decl.important {
                *existing = decl;
            }
            return;
        }

        match self.get(decl.base_property()).map(|base| base.important) {
            Some(base_important) => {
                if !base_important && decl.important {
                    self.declarations.push(decl);
                }
            }
            None => self.declarations.insert(0, decl),
        }
    }

    /// Merge a rule's declaration text, visiting declarations last to first
    pub fn digest_text(&mut self, declarations: &str) {
        for decl in declarations.split(';').rev().filter_map(StyleDeclaration::parse) {
            self.digest(decl);
        }
    }

    pub fn get(&self, property: &str) -> Option<&StyleDeclaration> {
        self.declarations.iter().find(|d| d.property == property)
    }

    fn position(&self, property: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.property == property)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StyleDeclaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// `prop:value;prop:value`
    pub fn serialize(&self) -> String {
        self.declarations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}
