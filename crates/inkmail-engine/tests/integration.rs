//! Integration tests - full pipeline from template to deliverable email
//!
//! Tests the complete workflow: tags → composition → DOM → links → CSS → tracking

use std::sync::Arc;

use inkmail_engine::{
    render_email_body, CollaboratorError, ContentLinkMap, EmailRenderer, FixedTrackingId,
    MasterTemplate, NoContentLinks, RenderConfig, RenderContext, SigningService,
    StaticTemplateSource, Tag, TemplateSource, TrackingConfig, TrackingIdAllocator,
};
use inkmail_engine::html::parse;
use inkmail_engine::template::ENVELOPE_DOCTYPE;

const BASE: &str = "https://example.com";

fn render(raw: &str, master: Option<&MasterTemplate>, tags: &[Tag], tracking: &TrackingConfig) -> String {
    let config = RenderConfig::new(BASE);
    let ctx = RenderContext::new(&config, tracking, &NoContentLinks);
    render_email_body(raw, master, tags, &ctx)
}

struct PrefixSigner;

impl SigningService for PrefixSigner {
    fn sign(&self, payload: &str) -> Result<String, CollaboratorError> {
        Ok(format!("sig-{payload}"))
    }
}

struct BrokenTemplates;

impl TemplateSource for BrokenTemplates {
    fn master_template(&self) -> Result<Option<MasterTemplate>, CollaboratorError> {
        Err(CollaboratorError::Unavailable {
            service: "content tree",
            message: "node 1051 missing".to_string(),
        })
    }
}

struct BrokenAllocator;

impl TrackingIdAllocator for BrokenAllocator {
    fn predict_next_id(&self) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Other("log table locked".to_string()))
    }
}

// ============================================================================
// FULL PIPELINE TESTS
// ============================================================================

#[test]
fn test_end_to_end_important_longhand() {
    let master = MasterTemplate::new("[#content#]", "p{padding-top:5px!important}");
    let tags = [Tag::new("name", "Hi").unwrap()];
    let out = render(
        "<p style='padding:1px'>[#name#]</p>",
        Some(&master),
        &tags,
        &TrackingConfig::disabled(),
    );
    assert_eq!(out, r#"<p style="padding:1px;padding-top:5px">Hi</p>"#);

    let doc = parse(&out);
    let p = doc.tree().elements_by_tag(&["p"])[0];
    assert_eq!(doc.tree().text_content(p), "Hi");
}

#[test]
fn test_click_tracking_rewrite() {
    let tracking = TrackingConfig::enabled("42", Some("token".to_string()));
    let out = render(r#"<a href="/promo">Shop</a>"#, None, &[], &tracking);
    assert!(out.starts_with(
        r#"<a href="https://example.com?i=42&amp;a=click&amp;v=https%3A%2F%2Fexample.com%2Fpromo" target="_blank">Shop</a>"#
    ));
    assert!(out.ends_with(
        r#"<img style="opacity:0" src="https://example.com/s.gif?i=42&a=view&ipignore=true">"#
    ));
}

#[test]
fn test_assets_absolutized() {
    let out = render(
        r#"<img src="/images/a.png"><img src="https://cdn.example.org/b.png"><table background="/bg.png"><tr><td>x</td></tr></table>"#,
        None,
        &[],
        &TrackingConfig::disabled(),
    );
    assert!(out.contains(r#"src="https://example.com/images/a.png""#));
    assert!(out.contains(r#"src="https://cdn.example.org/b.png""#));
    assert!(out.contains(r#"background="https://example.com/bg.png""#));
}

#[test]
fn test_outlook_conditional_comment_absolutized() {
    let out = render(
        r#"<!--[if gte mso 9]><v:image src="/bg.jpg" /><![endif]--><p>x</p>"#,
        None,
        &[],
        &TrackingConfig::disabled(),
    );
    assert!(out.contains(r#"<v:image src="https://example.com/bg.jpg" />"#));
}

#[test]
fn test_conditionals_and_layout() {
    let master = MasterTemplate::new(
        r#"<table class="wrap"><tr><td>[#content#]</td></tr></table>"#,
        ".wrap td{text-align:center;background-color:#ffffff}",
    );
    let tags = [
        Tag::flag("member", false).unwrap(),
        Tag::new("firstname", "Ann").unwrap(),
    ];
    let out = render(
        "<p>Hello [#firstname#]</p>[#member#]<p>Thanks</p>[#else#]<p>Join</p>[#/member#]",
        Some(&master),
        &tags,
        &TrackingConfig::disabled(),
    );
    assert_eq!(
        out,
        r##"<table class="wrap"><tbody><tr><td style="text-align:center;background-color:#ffffff" bgcolor="#ffffff" align="center"><p>Hello Ann</p><p>Join</p></td></tr></tbody></table>"##
    );
}

#[test]
fn test_web_version_link() {
    let tracking = TrackingConfig::enabled("7", Some("abc=".to_string()));
    let out = render(r#"<a href="[#webversion#]">View online</a>"#, None, &[], &tracking);
    assert!(out.contains(r#"href="https://example.com?i=7&a=webversion&auth=abc%3D""#));
}

#[test]
fn test_editor_prefixed_tag_link() {
    let tags = [Tag::new("unsubscribe", "https://example.com/unsub?u=5").unwrap()];
    let out = render(
        r#"<a href="/umbraco/[#unsubscribe#]">Unsubscribe</a>"#,
        None,
        &tags,
        &TrackingConfig::disabled(),
    );
    assert_eq!(
        out,
        r#"<a href="https://example.com/unsub?u=5" target="_blank">Unsubscribe</a>"#
    );
}

#[test]
fn test_empty_template_renders_empty() {
    assert_eq!(render("", None, &[], &TrackingConfig::enabled("1", None)), "");
}

// ============================================================================
// RENDERER FACADE
// ============================================================================

#[test]
fn test_renderer_with_tracking() {
    let master = MasterTemplate::new("<div>[#content#]</div>", "");
    let renderer = EmailRenderer::new(
        RenderConfig::new(BASE),
        Arc::new(StaticTemplateSource(Some(master))),
        Arc::new(ContentLinkMap::new().with_link(1200, "/about")),
    )
    .with_tracking(Arc::new(FixedTrackingId("99".to_string())), Arc::new(PrefixSigner));

    let email = renderer.render(r#"<a href="/{localLink:1200}">About</a>"#, &[]);
    assert_eq!(email.tracking_id.as_deref(), Some("99"));
    assert!(email.body.starts_with(
        r#"<div><a href="https://example.com?i=99&amp;a=click&amp;v=https%3A%2F%2Fexample.com%2Fabout" target="_blank">About</a></div>"#
    ));
    assert!(email.html.starts_with(ENVELOPE_DOCTYPE));
    assert!(email.html.contains("<head><style>html,body,p,div{"));
}

#[test]
fn test_renderer_degrades_on_collaborator_failure() {
    let renderer = EmailRenderer::new(
        RenderConfig::new(BASE),
        Arc::new(BrokenTemplates),
        Arc::new(NoContentLinks),
    )
    .with_tracking(Arc::new(BrokenAllocator), Arc::new(PrefixSigner));

    let email = renderer.render("<p>Still delivered</p>", &[]);
    assert_eq!(email.body, "<p>Still delivered</p>");
    assert_eq!(email.tracking_id, None);
}

#[test]
fn test_renderer_subject_and_text() {
    let renderer = EmailRenderer::without_layout(RenderConfig::new(BASE), Arc::new(NoContentLinks));
    let tags = [Tag::new("order", "1042").unwrap(), Tag::flag("express", true).unwrap()];
    assert_eq!(
        renderer.render_subject("Order [#order#]\n[#express#](express)[#/express#]", &tags),
        "Order 1042 (express)"
    );
    assert_eq!(renderer.render_text("#[#order#]", &tags), "#1042");
}

#[test]
fn test_renderer_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EmailRenderer>();
}
