use axum::http::HeaderMap;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Check the platform signature over the raw request body.
///
/// The header must carry base64(HMAC-SHA256(channel secret, body)).
/// Verification is skipped when no channel secret is configured.
pub(super) fn verify_line(
    secret: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), &'static str> {
    let Some(secret) = secret.filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };
    let signature = headers
        .get("x-line-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or("missing_signature")?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "bad_secret")?;
    mac.update(body);
    let expected = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    if expected != signature {
        return Err("invalid_signature");
    }
    Ok(())
}
