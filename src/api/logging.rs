//! Diagnostic logging of outbound requests and their responses.
//!
//! Everything goes to `log::debug!`. Bodies are truncated and the
//! `Authorization` value is masked.

use super::client::PreparedBody;
use super::endpoints::{Headers, AUTHORIZATION};

/// Bytes of a body shown in logs.
const BODY_LOG_LIMIT: usize = 1024;

pub(crate) fn log_request(
    method: &str,
    url: &str,
    headers: &Headers,
    body: Option<&PreparedBody>,
) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("{} {}", method, url);
    for (name, value) in headers {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            log::debug!("   {}: {}", name, mask(value));
        } else {
            log::debug!("   {}: {}", name, value);
        }
    }
    match body {
        Some(PreparedBody::Json(bytes)) => log::debug!("Body: {}", preview(bytes)),
        Some(PreparedBody::Multipart(form)) => log::debug!("Body: {}", form.summary()),
        None => {}
    }
}

pub(crate) fn log_response(method: &str, url: &str, status: u16, body: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
    if !body.is_empty() {
        log::debug!("Response: {}", preview(body));
    }
}

fn mask(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, token)) => format!("{} {}…", scheme, token.chars().take(4).collect::<String>()),
        None => "…".to_string(),
    }
}

/// UTF-8 preview of at most [`BODY_LOG_LIMIT`] bytes.
pub(crate) fn preview(body: &[u8]) -> String {
    let cut = body.len().min(BODY_LOG_LIMIT);
    let text = String::from_utf8_lossy(&body[..cut]);
    if body.len() > BODY_LOG_LIMIT {
        format!("{}… ({} bytes total)", text, body.len())
    } else {
        text.into_owned()
    }
}
