//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use inkmail_engine::Tag;

#[derive(Parser, Debug)]
#[command(
    name = "inkmail",
    author,
    version,
    about = "Render a data-driven HTML email ready for delivery"
)]
pub struct Args {
    /// Email body template
    #[arg(short, long)]
    pub template: PathBuf,

    /// Master layout holding the content marker
    #[arg(short, long)]
    pub master: Option<PathBuf>,

    /// Stylesheet of the master layout
    #[arg(short, long, requires = "master")]
    pub css: Option<PathBuf>,

    /// Emit the stylesheet as a <style> block instead of inlining it
    #[arg(long)]
    pub no_inline: bool,

    /// Tag replacement, e.g. --tag firstname=Ann (repeatable)
    #[arg(long = "tag", value_name = "NAME=VALUE", value_parser = parse_tag)]
    pub tags: Vec<Tag>,

    /// Flag for conditional blocks, e.g. --flag member=true (repeatable)
    #[arg(long = "flag", value_name = "NAME=true|false", value_parser = parse_flag)]
    pub flags: Vec<Tag>,

    /// TOML render configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Site URL, overrides the configuration
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log id to render tracking for
    #[arg(long)]
    pub tracking_id: Option<String>,

    /// Signed token for the web version link
    #[arg(long, requires = "tracking_id")]
    pub web_version_token: Option<String>,

    /// Subject line to render and print to stderr
    #[arg(long)]
    pub subject: Option<String>,

    /// Write the email here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Tags and flags in the order they were given
    pub fn all_tags(&self) -> Vec<Tag> {
        self.tags.iter().chain(&self.flags).cloned().collect()
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))
}

fn parse_tag(raw: &str) -> Result<Tag, String> {
    let (name, value) = split_pair(raw)?;
    Tag::new(name, value).map_err(|e| e.to_string())
}

fn parse_flag(raw: &str) -> Result<Tag, String> {
    let (name, value) = split_pair(raw)?;
    let state = match value.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => return Err(format!("flag {name:?} must be true or false, got {other:?}")),
    };
    Tag::flag(name, state).map_err(|e| e.to_string())
}
