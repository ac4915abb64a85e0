//! Tracking - web version links, the view pixel and tracking requests
//!
//! Every tracking URL points at the site root with a query string:
//!
//! | param  | meaning                                   |
//! |--------|-------------------------------------------|
//! | `i`    | log id of the email                       |
//! | `a`    | action: `view`, `click` or `webversion`   |
//! | `v`    | click target (form-urlencoded)            |
//! | `auth` | signed token for the web version          |

use std::fmt;

use regex::Regex;
use url::form_urlencoded;

use crate::TrackingError;

/// Endpoints the injector writes into the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingUrls {
    /// Site URL without trailing slash
    pub base_url: String,
    /// Pixel path below the site URL
    pub pixel_path: String,
    /// Placeholder replaced by the web version URL
    pub web_version_marker: String,
}

/// Tracked action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingAction {
    View,
    Click,
    WebVersion,
}

impl TrackingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::WebVersion => "webversion",
        }
    }

    pub fn parse(action: &str) -> Option<Self> {
        match action.to_ascii_lowercase().as_str() {
            "view" => Some(Self::View),
            "click" => Some(Self::Click),
            "webversion" => Some(Self::WebVersion),
            _ => None,
        }
    }
}

impl fmt::Display for TrackingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// `{base}?i={id}&a=click&v={target}`
pub fn click_url(base_url: &str, tracking_id: &str, target: &str) -> String {
    format!(
        "{base_url}?i={tracking_id}&a={}&v={}",
        TrackingAction::Click,
        encode(target)
    )
}

/// `{base}?i={id}&a=webversion&auth={token}`
pub fn web_version_url(base_url: &str, tracking_id: &str, auth_token: &str) -> String {
    format!(
        "{base_url}?i={tracking_id}&a={}&auth={}",
        TrackingAction::WebVersion,
        encode(auth_token)
    )
}

/// Invisible image reporting a view when the client loads it
pub fn tracking_pixel(urls: &TrackingUrls, tracking_id: &str) -> String {
    format!(
        r#"<img style="opacity:0" src="{}{}?i={tracking_id}&a={}&ipignore=true">"#,
        urls.base_url,
        urls.pixel_path,
        TrackingAction::View
    )
}

/// Replace the web version marker and, when `enabled`, insert the view pixel
/// before the last `</body>` (appended when there is none).
///
/// Running it twice with the same inputs does not add a second pixel.
pub fn inject_tracking(
    html: &str,
    tracking_id: &str,
    enabled: bool,
    auth_token: &str,
    urls: &TrackingUrls,
) -> String {
    let mut output = html.to_string();

    if !urls.web_version_marker.is_empty() && output.contains(&urls.web_version_marker) {
        let url = web_version_url(&urls.base_url, tracking_id, auth_token);
        output = output.replace(&urls.web_version_marker, &url);
    }

    if !enabled {
        return output;
    }

    let pixel = tracking_pixel(urls, tracking_id);
    if output.contains(&pixel) {
        return output;
    }
    // ASCII lowercasing keeps byte offsets
    match output.to_ascii_lowercase().rfind("</body>") {
        Some(index) => output.insert_str(index, &pixel),
        None => output.push_str(&pixel),
    }
    output
}

/// Remove the view pixel, e.g. before showing a logged email as web version
pub fn strip_tracking_pixel(html: &str, pixel_path: &str) -> String {
    let pattern = format!(r#"<img[^>]*?src="[^"]*?{}[^"]*"[^>]*>"#, regex::escape(pixel_path));
    match Regex::new(&pattern) {
        Ok(pixel) => pixel.replace_all(html, "").into_owned(),
        Err(e) => {
            tracing::warn!("Cannot build tracking pixel pattern: {}", e);
            html.to_string()
        }
    }
}

/// A request against the tracking endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    pub mail_id: u64,
    pub action: TrackingAction,
    /// Click target
    pub value: Option<String>,
    /// Web version token
    pub auth: Option<String>,
}

impl TrackingEvent {
    /// Parse the query string of a tracking request (leading `?` optional)
    pub fn from_query(query: &str) -> Result<Self, TrackingError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut mail_id = None;
        let mut action = None;
        let mut value = None;
        let mut auth = None;

        for (key, val) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "i" => mail_id = Some(val.into_owned()),
                "a" => action = Some(val.into_owned()),
                "v" => value = Some(val.into_owned()),
                "auth" => auth = Some(val.into_owned()),
                _ => {}
            }
        }

        let raw_id = mail_id.ok_or(TrackingError::MissingMailId)?;
        let mail_id = raw_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(TrackingError::InvalidMailId(raw_id))?;
        let raw_action = action.ok_or(TrackingError::MissingAction)?;
        let action = TrackingAction::parse(&raw_action).ok_or(TrackingError::UnknownAction(raw_action))?;

        Ok(Self {
            mail_id,
            action,
            value,
            auth,
        })
    }
}
