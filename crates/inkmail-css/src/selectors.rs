//! Selectors - parsing and matching of the mail-safe selector subset
//!
//! Supported: type selectors, `*`, `.class`, `#id`, the descendant, `>`, `+`
//! and `~` combinators, `:first-child`, `:last-child`, `:only-child`,
//! `:empty`, and attribute selectors using `|=`, `*=`, `~=`, `^=` or `!=`.

use inkmail_dom::{DomTree, NodeId};

use crate::SelectorError;

/// Matches selectors against a DOM tree
pub trait SelectorEngine {
    /// All elements matching `selector`, in document order
    fn select(&self, tree: &DomTree, selector: &str) -> Result<Vec<NodeId>, SelectorError>;
}

/// Default engine for compound selectors joined by combinators
#[derive(Debug, Default, Clone, Copy)]
pub struct CompoundSelectorEngine;

impl CompoundSelectorEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SelectorEngine for CompoundSelectorEngine {
    fn select(&self, tree: &DomTree, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = ComplexSelector::parse(selector)?;
        Ok(tree
            .elements()
            .into_iter()
            .filter(|&id| selector.matches(tree, id))
            .collect())
    }
}

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Structural pseudo-class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
}

impl PseudoClass {
    /// Parse from the name after the colon
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Self::FirstChild => tree.prev_element_sibling(id).is_none(),
            Self::LastChild => tree.next_element_sibling(id).is_none(),
            Self::OnlyChild => {
                tree.prev_element_sibling(id).is_none() && tree.next_element_sibling(id).is_none()
            }
            Self::Empty => {
                tree.element_children(id).next().is_none() && tree.text_content(id).trim().is_empty()
            }
        }
    }
}

/// Attribute value operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// `[attr|=value]` - exact or prefix followed by a hyphen
    DashMatch(String),
    /// `[attr*=value]` - contains substring
    Substring(String),
    /// `[attr~=value]` - whitespace-separated list contains
    Contains(String),
    /// `[attr^=value]` - starts with
    Prefix(String),
    /// `[attr!=value]` - absent or different
    NotEqual(String),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: AttributeMatcher,
}

impl AttributeSelector {
    /// Check an attribute value (`None` when the attribute is absent)
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (AttributeMatcher::NotEqual(expected), value) => value != Some(expected.as_str()),
            (_, None) => false,
            (AttributeMatcher::DashMatch(expected), Some(val)) => {
                val == expected
                    || val
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            (AttributeMatcher::Substring(expected), Some(val)) => val.contains(expected.as_str()),
            (AttributeMatcher::Contains(expected), Some(val)) => {
                val.split_whitespace().any(|w| w == expected)
            }
            (AttributeMatcher::Prefix(expected), Some(val)) => val.starts_with(expected.as_str()),
        }
    }
}

/// Simple selectors applying to one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Tag name; `None` for `*` or when omitted
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub pseudo_classes: Vec<PseudoClass>,
}

impl CompoundSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !elem.name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.ids.iter().all(|wanted| elem.id() == Some(wanted.as_str()))
            && self.classes.iter().all(|class| elem.has_class(class))
            && self
                .attributes
                .iter()
                .all(|attr| attr.matches(elem.get_attr(&attr.name)))
            && self.pseudo_classes.iter().all(|p| p.matches(tree, id))
    }
}

/// Compound selectors joined by combinators, e.g. `table.main > tr td`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Parse one selector (no commas)
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        SelectorParser::new(selector).parse()
    }

    /// `100 × ids + 10 × (classes, attribute selectors, pseudo-classes) + type selectors`
    pub fn specificity(&self) -> u32 {
        self.compounds
            .iter()
            .map(|c| {
                let ids = c.ids.len() as u32;
                let class_level = (c.classes.len() + c.attributes.len() + c.pseudo_classes.len()) as u32;
                let elements = u32::from(c.tag.is_some());
                ids * 100 + class_level * 10 + elements
            })
            .sum()
    }

    /// Whether element `id` is matched by this selector
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(tree, id, n - 1),
        }
    }

    /// Right-to-left matching of `compounds[..=index]` ending at `id`
    fn matches_at(&self, tree: &DomTree, id: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let previous = index - 1;
        match self.combinators[previous] {
            Combinator::Child => tree
                .parent(id)
                .is_some_and(|parent| self.matches_at(tree, parent, previous)),
            Combinator::Descendant => {
                let mut current = tree.parent(id);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, previous) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
            Combinator::NextSibling => tree
                .prev_element_sibling(id)
                .is_some_and(|sibling| self.matches_at(tree, sibling, previous)),
            Combinator::SubsequentSibling => {
                let mut current = tree.prev_element_sibling(id);
                while let Some(sibling) = current {
                    if self.matches_at(tree, sibling, previous) {
                        return true;
                    }
                    current = tree.prev_element_sibling(sibling);
                }
                false
            }
        }
    }
}

/// Hand-written scanner over one selector
struct SelectorParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.pos += 1;
                    compound.ids.push(self.ident()?);
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                '[' => compound.attributes.push(self.attribute()?),
                ':' => {
                    self.pos += 1;
                    let name = self.ident()?;
                    let pseudo = PseudoClass::parse(&name)
                        .ok_or_else(|| SelectorError::UnsupportedPseudoClass(name.clone()))?;
                    compound.pseudo_classes.push(pseudo);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::Empty(self.source.to_string())),
            };
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.pos += 1; // '['
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let matcher: fn(String) -> AttributeMatcher = match self.chars.get(self.pos..self.pos + 2) {
            Some(['|', '=']) => AttributeMatcher::DashMatch,
            Some(['*', '=']) => AttributeMatcher::Substring,
            Some(['~', '=']) => AttributeMatcher::Contains,
            Some(['^', '=']) => AttributeMatcher::Prefix,
            Some(['!', '=']) => AttributeMatcher::NotEqual,
            _ => return Err(SelectorError::UnsupportedAttribute(self.source.to_string())),
        };
        self.pos += 2;
        self.skip_whitespace();
        let value = self.attribute_value()?;
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(SelectorError::UnsupportedAttribute(self.source.to_string()));
        }
        self.pos += 1;

        Ok(AttributeSelector {
            name,
            matcher: matcher(value),
        })
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(SelectorError::UnsupportedAttribute(self.source.to_string()));
                }
                let value = self.slice(start);
                self.pos += 1;
                Ok(value)
            }
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ']' && !c.is_whitespace()) {
                    self.pos += 1;
                }
                Ok(self.slice(start))
            }
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::Empty(self.source.to_string())),
            };
        }
        Ok(self.slice(start))
    }

    /// Characters from `start` up to the cursor; empty when out of range
    fn slice(&self, start: usize) -> String {
        self.chars
            .get(start..self.pos)
            .map(|chars| chars.iter().collect())
            .unwrap_or_default()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, c: char) -> SelectorError {
        SelectorError::UnexpectedCharacter {
            selector: self.source.to_string(),
            character: c,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmail_dom::Document;

    /// <table class="main"><tr><td id="a" lang="en-US">x</td><td class="b c"></td></tr></table>
    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::empty();
        let tree = doc.tree_mut();
        let table = tree.create_element("table");
        let tr = tree.create_element("tr");
        let td1 = tree.create_element("td");
        let td2 = tree.create_element("td");
        let text = tree.create_text("x");
        tree.append_child(NodeId::ROOT, table).unwrap();
        tree.append_child(table, tr).unwrap();
        tree.append_child(tr, td1).unwrap();
        tree.append_child(td1, text).unwrap();
        tree.append_child(tr, td2).unwrap();
        tree.set_attr(table, "class", "main").unwrap();
        tree.set_attr(td1, "id", "a").unwrap();
        tree.set_attr(td1, "lang", "en-US").unwrap();
        tree.set_attr(td2, "class", "b c").unwrap();
        (doc, table, td1, td2)
    }

    fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
        CompoundSelectorEngine::new().select(doc.tree(), selector).unwrap()
    }

    #[test]
    fn test_specificity() {
        let weight = |s: &str| ComplexSelector::parse(s).unwrap().specificity();
        assert_eq!(weight("td"), 1);
        assert_eq!(weight("*"), 0);
        assert_eq!(weight(".a"), 10);
        assert_eq!(weight("#a"), 100);
        assert_eq!(weight("table.main td#a"), 112);
        assert_eq!(weight("td:first-child"), 11);
        assert_eq!(weight("td[lang|=en]"), 11);
    }

    #[test]
    fn test_simple_selectors() {
        let (doc, table, td1, td2) = sample();
        assert_eq!(select(&doc, "td"), vec![td1, td2]);
        assert_eq!(select(&doc, "#a"), vec![td1]);
        assert_eq!(select(&doc, ".c"), vec![td2]);
        assert_eq!(select(&doc, "td.b.c"), vec![td2]);
        assert_eq!(select(&doc, "TABLE"), vec![table]);
        assert!(select(&doc, "p").is_empty());
    }

    #[test]
    fn test_combinators() {
        let (doc, _, td1, td2) = sample();
        assert_eq!(select(&doc, ".main td"), vec![td1, td2]);
        assert!(select(&doc, ".main > td").is_empty());
        assert_eq!(select(&doc, "tr > td"), vec![td1, td2]);
        assert_eq!(select(&doc, "#a + td"), vec![td2]);
        assert_eq!(select(&doc, "td~td"), vec![td2]);
    }

    #[test]
    fn test_pseudo_classes() {
        let (doc, table, td1, td2) = sample();
        assert_eq!(select(&doc, "td:first-child"), vec![td1]);
        assert_eq!(select(&doc, "td:last-child"), vec![td2]);
        assert_eq!(select(&doc, "table:only-child"), vec![table]);
        assert_eq!(select(&doc, "td:empty"), vec![td2]);
    }

    #[test]
    fn test_attribute_operators() {
        let (doc, _, td1, td2) = sample();
        assert_eq!(select(&doc, "td[lang|=en]"), vec![td1]);
        assert_eq!(select(&doc, "td[lang^='en']"), vec![td1]);
        assert_eq!(select(&doc, "td[class~=\"c\"]"), vec![td2]);
        assert_eq!(select(&doc, "td[lang*=US]"), vec![td1]);
        assert_eq!(select(&doc, "td[lang!=en-US]"), vec![td2]);
    }

    #[test]
    fn test_unsupported_syntax_rejected() {
        assert!(matches!(
            ComplexSelector::parse("a:hover"),
            Err(SelectorError::UnsupportedPseudoClass(_))
        ));
        assert!(matches!(
            ComplexSelector::parse("td[nowrap]"),
            Err(SelectorError::UnsupportedAttribute(_))
        ));
        assert!(ComplexSelector::parse("").is_err());
        assert!(ComplexSelector::parse("td >").is_err());
    }

    #[test]
    fn test_truncated_attribute_rejected() {
        for selector in ["td[lang", "p[lang|", "p[", "a[x=\"y", "p[lang|=", "p[lang|=en", "td[ lang ^= 'en'"] {
            assert!(
                matches!(
                    ComplexSelector::parse(selector),
                    Err(SelectorError::UnsupportedAttribute(_) | SelectorError::Empty(_))
                ),
                "{selector:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_stray_characters_rejected() {
        for selector in ["p{", "}p", "p]", "td > > td", "p,"] {
            assert!(ComplexSelector::parse(selector).is_err(), "{selector:?} should be rejected");
        }
        assert!(ComplexSelector::parse("td.grüße").is_ok());
    }
}
