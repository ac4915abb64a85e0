//! CSS rule extraction
//!
//! Mail stylesheets are flat lists of `selector-list { declarations }`
//! blocks. At-rule preludes and broken rules never match the rule pattern;
//! rules nested inside an at-rule are picked up as plain rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::selectors::ComplexSelector;
use crate::{CssRule, Stylesheet};

static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?P<selector>[^{}]+)\{(?P<style>[^{}]+)\}").expect("static regex")
});

/// CSS Parser
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a stylesheet into one rule per accepted selector
    pub fn parse(&self, css: &str) -> Stylesheet {
        let css = Self::strip_comments(css);
        let mut stylesheet = Stylesheet::default();

        for caps in RULE.captures_iter(&css) {
            let selector_list = caps["selector"].trim();
            let declarations = caps["style"].trim().replace('"', "'");

            for selector in selector_list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match ComplexSelector::parse(selector) {
                    Ok(parsed) => {
                        let source_order = stylesheet.rules.len();
                        stylesheet.rules.push(CssRule {
                            selector: selector.to_string(),
                            declarations: declarations.clone(),
                            specificity: parsed.specificity(),
                            source_order,
                        });
                    }
                    Err(e) => tracing::debug!("Skipping selector {:?}: {}", selector, e),
                }
            }
        }

        tracing::debug!("Parsed {} CSS rules", stylesheet.rules.len());
        stylesheet
    }

    /// Remove `//` comment lines and `/* */` comments, joining everything
    /// onto one line. An unterminated block comment runs to the end.
    pub fn strip_comments(css: &str) -> String {
        let mut joined: String = css
            .split('\n')
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .concat()
            .replace('\r', "");

        while let Some(start) = joined.find("/*") {
            match joined[start + 2..].find("*/") {
                Some(offset) => joined.replace_range(start..start + 2 + offset + 2, ""),
                None => joined.truncate(start),
            }
        }
        joined
    }
}
