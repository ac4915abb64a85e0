//! inkmail - render an email template from the command line

mod args;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use inkmail_engine::{
    CollaboratorError, EmailRenderer, FixedTrackingId, MasterTemplate, NoContentLinks, RenderConfig,
    SigningService, StaticTemplateSource,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::Args;

/// Web version token handed in on the command line
struct PresignedToken(Option<String>);

impl SigningService for PresignedToken {
    fn sign(&self, _payload: &str) -> Result<String, CollaboratorError> {
        self.0.clone().ok_or_else(|| CollaboratorError::Unavailable {
            service: "signing",
            message: "no --web-version-token given".to_string(),
        })
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = load_config(&args)?;
    let master = load_master(&args)?;
    let template = read(&args.template)?;

    tracing::info!(
        "Rendering {} for {}",
        args.template.display(),
        config.website_url
    );

    let mut renderer = EmailRenderer::new(
        config,
        Arc::new(StaticTemplateSource(master)),
        Arc::new(NoContentLinks),
    );
    if let Some(id) = &args.tracking_id {
        renderer = renderer.with_tracking(
            Arc::new(FixedTrackingId(id.clone())),
            Arc::new(PresignedToken(args.web_version_token.clone())),
        );
    }

    let tags = args.all_tags();
    let email = renderer.render(&template, &tags);

    if let Some(subject) = &args.subject {
        eprintln!("Subject: {}", renderer.render_subject(subject, &tags));
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &email.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", email.html.len(), path.display());
        }
        None => println!("{}", email.html),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_toml_str(&read(path)?)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.website_url = base_url.trim_end_matches('/').to_string();
        config.validate().context("Invalid --base-url")?;
    }
    Ok(config)
}

fn load_master(args: &Args) -> Result<Option<MasterTemplate>> {
    let Some(path) = &args.master else {
        return Ok(None);
    };
    let css = match &args.css {
        Some(css) => read(css)?,
        None => String::new(),
    };
    let master = MasterTemplate::new(read(path)?, css);
    Ok(Some(if args.no_inline {
        master.with_inlining_disabled()
    } else {
        master
    }))
}
