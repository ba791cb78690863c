use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{debug, warn};

use relay_module::adapters::line::LineInboundAdapter;
use relay_module::channel::InboundAdapter;

use super::state::GatewayState;
use super::verify::verify_line;

pub(super) async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(super) async fn receive_line_webhook(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err(reason) = verify_line(state.channel_secret.as_deref(), &headers, &body) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": reason})));
    }

    let adapter = LineInboundAdapter::new();
    let messages = match adapter.parse(&body) {
        Ok(messages) => messages,
        Err(err) => {
            warn!("gateway failed to parse webhook payload: {}", err);
            return (StatusCode::BAD_REQUEST, Json(json!({"status": "bad_json"})));
        }
    };

    if messages.is_empty() {
        debug!("gateway ignoring delivery with no answerable text messages");
        return (StatusCode::OK, Json(json!({"status": "ignored"})));
    }

    for message in &messages {
        state.relay.handle_message(message).await;
    }

    (
        StatusCode::OK,
        Json(json!({"status": "accepted", "handled": messages.len()})),
    )
}
