//! Style Cascade & Inliner
//!
//! Resolves a stylesheet into per-element `style` attributes:
//! 1. Sort rules by specificity, then source order, both descending
//! 2. Match each rule's selector against the document
//! 3. Merge the rule's declarations into every matched element
//!
//! Rules run from strongest to weakest, so a value already present on an
//! element came from an equal or stronger source and is only replaced by an
//! `!important` declaration.

use inkmail_dom::{Document, NodeId};

use crate::selectors::{CompoundSelectorEngine, SelectorEngine};
use crate::style::ElementStyle;
use crate::{CssError, CssParser, CssRule};

/// Inlines CSS rules into `style` attributes
#[derive(Debug, Default)]
pub struct CssInliner<E = CompoundSelectorEngine> {
    engine: E,
}

impl CssInliner {
    pub fn new() -> Self {
        Self {
            engine: CompoundSelectorEngine::new(),
        }
    }
}

impl<E: SelectorEngine> CssInliner<E> {
    /// Use another selector engine
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Inline `css` into the document. Returns the number of rules applied.
    pub fn inline(&self, doc: &mut Document, css: &str) -> usize {
        let mut rules = CssParser::new().parse(css).rules;
        rules.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| b.source_order.cmp(&a.source_order))
        });

        let mut applied = 0;
        for rule in &rules {
            match self.apply_rule(doc, rule) {
                Ok(matched) => {
                    if matched > 0 {
                        applied += 1;
                    }
                }
                Err(e) => tracing::debug!("Skipping CSS rule {:?}: {}", rule.selector, e),
            }
        }

        tracing::debug!("Applied {} of {} CSS rules", applied, rules.len());
        applied
    }

    /// Apply one rule to every element it matches
    fn apply_rule(&self, doc: &mut Document, rule: &CssRule) -> Result<usize, CssError> {
        let matched = self.engine.select(doc.tree(), &rule.selector)?;
        for &node in &matched {
            apply_declarations(doc, node, &rule.declarations)?;
        }
        Ok(matched.len())
    }
}

fn apply_declarations(doc: &mut Document, node: NodeId, declarations: &str) -> Result<(), CssError> {
    let tree = doc.tree_mut();
    let style = match tree.attr(node, "style") {
        Some(current) if !current.trim().is_empty() => {
            let mut style = ElementStyle::parse(current);
            style.digest_text(declarations);
            style.serialize()
        }
        _ => declarations.to_string(),
    };
    tree.set_attr(node, "style", style)?;
    Ok(())
}
