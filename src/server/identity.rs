//! Device identity: the display name a browser last commented under.
//!
//! The name lives in a long-lived cookie and is compared to a comment's stored
//! commenter to decide whether the edit and delete controls apply.

use axum::http::{header, HeaderMap};
use url::form_urlencoded;

pub const DEVICE_COOKIE: &str = "wall_display_name";

const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Display name remembered by the requesting device, if any.
pub fn device_name(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == DEVICE_COOKIE)
        .and_then(|(_, raw)| decode(raw))
        .filter(|name| !name.trim().is_empty())
}

/// `Set-Cookie` value remembering `name` for this device.
pub fn remember_cookie(name: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        DEVICE_COOKIE, encoded, COOKIE_MAX_AGE_SECS
    )
}

fn decode(raw: &str) -> Option<String> {
    let query = format!("v={}", raw);
    form_urlencoded::parse(query.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
}
