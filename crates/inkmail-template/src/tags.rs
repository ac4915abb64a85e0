//! Tags - placeholder substitution and conditional blocks
//!
//! A tag `name` appears in templates as `[#name#]`. Flag tags (value `true` or
//! `false`) additionally drive blocks of the form
//!
//! ```text
//! [#name#]shown when true[#else#]shown when false[#/name#]
//! [#!name#]shown when false[#/!name#]
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::TagError;

pub const TAG_PREFIX: &str = "[#";
pub const TAG_SUFFIX: &str = "#]";

const ELSE_MARKER: &str = "[#else#]";

/// Upper bound on conditional passes per flag, guards against blocks that
/// keep producing new blocks
const MAX_CONDITIONAL_PASSES: usize = 32;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|[\r\n\x0C]").expect("static regex"));
static REPEATED_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("static regex"));

/// A named placeholder and its replacement value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    value: String,
}

impl Tag {
    /// Create a tag. Surrounding `[#` / `#]` on the name are stripped.
    pub fn new(name: &str, value: impl Into<String>) -> Result<Self, TagError> {
        let name = sanitize_name(name);
        if name.is_empty() {
            return Err(TagError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            value: value.into(),
        })
    }

    /// Create a flag tag whose value is `true` or `false`
    pub fn flag(name: &str, state: bool) -> Result<Self, TagError> {
        Self::new(name, if state { "true" } else { "false" })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `[#name#]`
    pub fn full_token(&self) -> String {
        format!("{TAG_PREFIX}{}{TAG_SUFFIX}", self.name)
    }

    /// Boolean state of a flag tag, `None` for ordinary tags
    pub fn flag_state(&self) -> Option<bool> {
        if self.value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if self.value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

fn sanitize_name(name: &str) -> &str {
    let name = name.strip_prefix(TAG_PREFIX).unwrap_or(name);
    name.strip_suffix(TAG_SUFFIX).unwrap_or(name)
}

/// Replace every `[#name#]` with its value, tags applied in list order
pub fn substitute_tags(text: &str, tags: &[Tag]) -> String {
    let mut output = text.to_string();
    if output.is_empty() {
        return output;
    }
    for tag in tags {
        let token = tag.full_token();
        if output.contains(&token) {
            output = output.replace(&token, &tag.value);
        }
    }
    output
}

/// Resolve the `[#name#]` and `[#!name#]` blocks of one flag
pub fn evaluate_conditionals(text: &str, name: &str, state: bool) -> String {
    let positive = resolve_blocks(text, &format!("[#{name}#]"), &format!("[#/{name}#]"), state);
    resolve_blocks(&positive, &format!("[#!{name}#]"), &format!("[#/!{name}#]"), !state)
}

fn resolve_blocks(text: &str, open: &str, close: &str, state: bool) -> String {
    if !text.contains(open) {
        return text.to_string();
    }
    let pattern = format!("(?s){}(.*?){}", regex::escape(open), regex::escape(close));
    let block = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Skipping conditional block {}: {}", open, e);
            return text.to_string();
        }
    };

    block
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            let parts: Vec<&str> = inner.split(ELSE_MARKER).collect();
            match (parts.as_slice(), state) {
                ([when_true, _], true) => (*when_true).to_string(),
                ([_, when_false], false) => (*when_false).to_string(),
                (_, true) => inner.to_string(),
                (_, false) => String::new(),
            }
        })
        .into_owned()
}

/// Full text rendering: conditionals of every flag tag, then literal
/// substitution. Used for bodies, plain text parts, subjects and addresses.
pub fn render_text(text: &str, tags: &[Tag]) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut output = text.to_string();
    for tag in tags {
        let Some(state) = tag.flag_state() else {
            continue;
        };
        for _ in 0..MAX_CONDITIONAL_PASSES {
            let next = evaluate_conditionals(&output, &tag.name, state);
            if next == output {
                break;
            }
            output = next;
        }
    }
    substitute_tags(&output, tags)
}

/// Subject lines are single-line plain text
pub fn sanitize_subject(subject: &str) -> String {
    let flattened = LINE_BREAKS.replace_all(subject, |caps: &regex::Captures<'_>| {
        if &caps[0] == "\r\n" { "" } else { " " }
    });
    let flattened = flattened.replace("&nbsp;", " ");
    REPEATED_SPACES.replace_all(&flattened, " ").into_owned()
}
