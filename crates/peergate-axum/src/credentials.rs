//! Basic-Auth credential extraction

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};
use peergate_types::Credential;

/// Extract a `(username, password)` pair from a `Basic` Authorization header.
///
/// Returns `None` when the header is missing, uses another scheme, or is not
/// valid base64 of `username:password`. The username ends at the first colon.
pub fn basic_credential(headers: &HeaderMap) -> Option<Credential> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credential::new(username, password))
}
