//! LINE Messaging API adapter for inbound webhook events and outbound
//! replies.
//!
//! This module provides adapters for handling LINE messages:
//! - `LineInboundAdapter`: Parses webhook deliveries into user messages
//! - `LineOutboundAdapter`: Replies via the Messaging API reply endpoint

use serde::{Deserialize, Serialize};

use crate::channel::{AdapterError, InboundAdapter, InboundMessage, SendResult};

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// Reply messages above this length are rejected by the platform.
pub const REPLY_TEXT_MAX_CHARS: usize = 5000;

/// Adapter for parsing LINE webhook deliveries.
#[derive(Debug, Clone, Default)]
pub struct LineInboundAdapter;

impl LineInboundAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl InboundAdapter for LineInboundAdapter {
    fn parse(&self, raw_payload: &[u8]) -> Result<Vec<InboundMessage>, AdapterError> {
        let payload: LineWebhookPayload = serde_json::from_slice(raw_payload)
            .map_err(|e| AdapterError::ParseError(e.to_string()))?;

        let mut messages = Vec::new();
        for event in payload.events {
            if event.event_type != "message" {
                continue;
            }
            // A reply token is only usable once; events without one (for
            // example redeliveries) cannot be answered.
            let Some(reply_token) = event
                .reply_token
                .filter(|token| !token.trim().is_empty())
            else {
                continue;
            };
            let Some(message) = event.message else {
                continue;
            };
            if message.message_type != "text" {
                continue;
            }
            let Some(text) = message.text else {
                continue;
            };

            messages.push(InboundMessage {
                reply_token,
                sender: event.source.and_then(|source| source.user_id),
                text,
                message_id: Some(message.id),
            });
        }

        Ok(messages)
    }
}

/// Adapter for replying via the LINE Messaging API.
#[derive(Debug, Clone)]
pub struct LineOutboundAdapter {
    /// Channel access token for the Messaging API.
    pub access_token: String,
    /// API base URL, overridable for tests.
    pub api_base: String,
}

impl LineOutboundAdapter {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(access_token: String, api_base: String) -> Self {
        Self {
            access_token,
            api_base,
        }
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.api_base.trim_end_matches('/'))
    }

    /// Reply to a token-identified event with a single text message.
    pub async fn send_reply(
        &self,
        reply_token: &str,
        text: &str,
    ) -> Result<SendResult, AdapterError> {
        if reply_token.trim().is_empty() {
            return Err(AdapterError::ConfigError(
                "no reply token for LINE message".to_string(),
            ));
        }

        let request = LineReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![LineTextMessage {
                message_type: "text".to_string(),
                text: truncate_reply_text(text),
            }],
        };

        let client = reqwest::Client::new();
        let response = client
            .post(self.reply_url())
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&request)
            .send()
            .await
            .map_err(|e| AdapterError::SendError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(SendResult {
                success: true,
                submitted_at: chrono::Utc::now().to_rfc3339(),
                error: None,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Ok(SendResult {
                success: false,
                submitted_at: String::new(),
                error: Some(format!("LINE API returned {}: {}", status, body)),
            })
        }
    }
}

fn truncate_reply_text(text: &str) -> String {
    if text.chars().count() <= REPLY_TEXT_MAX_CHARS {
        text.to_string()
    } else {
        text.chars().take(REPLY_TEXT_MAX_CHARS).collect()
    }
}

// ============================================================================
// LINE-specific types
// ============================================================================

/// Webhook delivery from LINE.
#[derive(Debug, Clone, Deserialize)]
pub struct LineWebhookPayload {
    /// Bot user ID the delivery was sent to
    pub destination: Option<String>,
    /// Events in this delivery
    #[serde(default)]
    pub events: Vec<LineEvent>,
}

/// One webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct LineEvent {
    /// Event kind: "message", "follow", "unfollow", ...
    #[serde(rename = "type")]
    pub event_type: String,
    /// Single-use token for replying to this event
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    /// Where the event came from
    pub source: Option<LineEventSource>,
    /// Message content for message events
    pub message: Option<LineEventMessage>,
    /// Event time (Unix milliseconds)
    pub timestamp: Option<i64>,
    /// Unique event identifier
    #[serde(rename = "webhookEventId")]
    pub webhook_event_id: Option<String>,
}

/// Source of an event.
#[derive(Debug, Clone, Deserialize)]
pub struct LineEventSource {
    /// "user", "group", or "room"
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
}

/// Message carried by a message event.
#[derive(Debug, Clone, Deserialize)]
pub struct LineEventMessage {
    /// Message identifier
    pub id: String,
    /// Message kind: "text", "sticker", "image", ...
    #[serde(rename = "type")]
    pub message_type: String,
    /// Text for text messages
    pub text: Option<String>,
}

/// Request body for the reply endpoint.
#[derive(Debug, Clone, Serialize)]
struct LineReplyRequest {
    #[serde(rename = "replyToken")]
    reply_token: String,
    messages: Vec<LineTextMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct LineTextMessage {
    #[serde(rename = "type")]
    message_type: String,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_message_event() {
        let payload = r#"{
            "destination": "U_bot",
            "events": [
                {
                    "type": "message",
                    "replyToken": "rtok-1",
                    "webhookEventId": "evt-1",
                    "timestamp": 1700000000000,
                    "source": {"type": "user", "userId": "U_alice"},
                    "message": {"id": "m1", "type": "text", "text": "hello bot"}
                }
            ]
        }"#;

        let adapter = LineInboundAdapter::new();
        let messages = adapter.parse(payload.as_bytes()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].reply_token, "rtok-1");
        assert_eq!(messages[0].sender.as_deref(), Some("U_alice"));
        assert_eq!(messages[0].text, "hello bot");
        assert_eq!(messages[0].message_id.as_deref(), Some("m1"));
    }

    #[test]
    fn skips_non_message_and_non_text_events() {
        let payload = r#"{
            "destination": "U_bot",
            "events": [
                {"type": "follow", "replyToken": "rtok-1", "source": {"type": "user", "userId": "U_a"}},
                {
                    "type": "message",
                    "replyToken": "rtok-2",
                    "source": {"type": "user", "userId": "U_a"},
                    "message": {"id": "m2", "type": "sticker"}
                },
                {
                    "type": "message",
                    "replyToken": "rtok-3",
                    "source": {"type": "user", "userId": "U_a"},
                    "message": {"id": "m3", "type": "text", "text": "second"}
                }
            ]
        }"#;

        let adapter = LineInboundAdapter::new();
        let messages = adapter.parse(payload.as_bytes()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].reply_token, "rtok-3");
        assert_eq!(messages[0].text, "second");
    }

    #[test]
    fn skips_events_without_reply_token() {
        let payload = r#"{
            "events": [
                {
                    "type": "message",
                    "source": {"type": "user", "userId": "U_a"},
                    "message": {"id": "m1", "type": "text", "text": "redelivered"}
                }
            ]
        }"#;

        let adapter = LineInboundAdapter::new();
        let messages = adapter.parse(payload.as_bytes()).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn empty_delivery_parses_to_nothing() {
        let adapter = LineInboundAdapter::new();
        let messages = adapter.parse(br#"{"destination": "U_bot", "events": []}"#).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let adapter = LineInboundAdapter::new();
        let result = adapter.parse(b"not json");
        assert!(matches!(result, Err(AdapterError::ParseError(_))));
    }

    #[test]
    fn long_reply_text_is_truncated() {
        let text = "x".repeat(REPLY_TEXT_MAX_CHARS + 10);
        let truncated = truncate_reply_text(&text);
        assert_eq!(truncated.chars().count(), REPLY_TEXT_MAX_CHARS);
    }

    #[test]
    fn short_reply_text_is_untouched() {
        assert_eq!(truncate_reply_text("hello"), "hello");
    }
}
