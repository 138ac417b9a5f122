use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use base64::prelude::*;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::WebError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const MAX_WEBHOOK_BODY_SIZE: usize = 1024 * 1024;

/// Accepted clock skew between the sender and this server, both directions.
const TIMESTAMP_TOLERANCE_SECONDS: i64 = 300;

fn is_timestamp_within_tolerance(timestamp_secs: i64, now_secs: i64) -> bool {
    (now_secs - timestamp_secs).abs() <= TIMESTAMP_TOLERANCE_SECONDS
}

/// Standard Webhooks signature check.
///
/// The secret is base64, optionally prefixed `whsec_`. The signature header
/// holds space-separated `v1,<base64>` entries over `{id}.{timestamp}.{body}`;
/// any matching entry is enough.
pub fn verify_standard_webhook_signature(
    secret: &str,
    webhook_id: &str,
    timestamp: &str,
    body: &[u8],
    signature_header: &str,
) -> bool {
    let secret_b64 = secret.strip_prefix("whsec_").unwrap_or(secret);

    let Ok(secret_bytes) = BASE64_STANDARD.decode(secret_b64) else {
        tracing::error!("Webhook secret is not valid base64");
        return false;
    };

    let mut signed_payload =
        Vec::with_capacity(webhook_id.len() + timestamp.len() + body.len() + 2);
    signed_payload.extend_from_slice(webhook_id.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(body);

    for part in signature_header.split(' ') {
        let Some(sig_b64) = part.strip_prefix("v1,") else {
            continue;
        };
        let Ok(sig_bytes) = BASE64_STANDARD.decode(sig_b64) else {
            continue;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(&secret_bytes) else {
            tracing::error!("Webhook secret cannot key an HMAC");
            return false;
        };
        mac.update(&signed_payload);

        if mac.verify_slice(&sig_bytes).is_ok() {
            return true;
        }
    }

    false
}

/// Reads `svix-<name>`, falling back to the unbranded `webhook-<name>`.
fn webhook_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    [format!("svix-{}", name), format!("webhook-{}", name)]
        .iter()
        .find_map(|key| headers.get(key.as_str()))
        .and_then(|value| value.to_str().ok())
}

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, WebError> {
    webhook_header(headers, name).ok_or_else(|| {
        tracing::warn!("Webhook rejected: missing {} header", name);
        WebError::Unauthorized
    })
}

/// Rejects webhook deliveries that are not signed with the configured secret.
pub async fn verify_webhook_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let Some(secret) = state.webhook_secret.clone() else {
        tracing::warn!("Webhook received but CLERK_WEBHOOK_SECRET is not configured");
        return Err(WebError::ServiceUnavailable(
            "Webhook endpoint is not configured".to_string(),
        ));
    };

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_WEBHOOK_BODY_SIZE)
        .await
        .map_err(|_| WebError::BadRequest("Webhook body too large or unreadable".to_string()))?;

    let webhook_id = required_header(&parts.headers, "id")?;
    let timestamp = required_header(&parts.headers, "timestamp")?;
    let signature = required_header(&parts.headers, "signature")?;

    let timestamp_secs: i64 = timestamp.parse().map_err(|_| {
        tracing::warn!("Webhook rejected: malformed timestamp {}", timestamp);
        WebError::Unauthorized
    })?;

    let now_secs = Utc::now().timestamp();
    if !is_timestamp_within_tolerance(timestamp_secs, now_secs) {
        tracing::warn!(
            "Webhook timestamp {} outside tolerance (now {}, tolerance {}s)",
            timestamp_secs,
            now_secs,
            TIMESTAMP_TOLERANCE_SECONDS
        );
        return Err(WebError::Unauthorized);
    }

    if !verify_standard_webhook_signature(&secret, webhook_id, timestamp, &bytes, signature) {
        tracing::warn!("Webhook {} rejected: signature mismatch", webhook_id);
        return Err(WebError::Unauthorized);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}
