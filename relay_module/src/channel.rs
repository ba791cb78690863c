//! Message types shared between the webhook gateway and the platform
//! adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to parse payload: {0}")]
    ParseError(String),
    #[error("failed to send message: {0}")]
    SendError(String),
    #[error("adapter misconfigured: {0}")]
    ConfigError(String),
}

/// One user message lifted out of a webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Single-use token authorizing one reply to this event.
    pub reply_token: String,
    /// Platform identifier of the sender, when the platform provides one.
    pub sender: Option<String>,
    /// Text typed by the user.
    pub text: String,
    /// Platform identifier of the message.
    pub message_id: Option<String>,
}

/// Outcome of an outbound send.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub success: bool,
    pub submitted_at: String,
    pub error: Option<String>,
}

/// Parses raw webhook payloads from a messaging platform.
pub trait InboundAdapter {
    /// Parse one webhook delivery into the user messages it carries.
    fn parse(&self, raw_payload: &[u8]) -> Result<Vec<InboundMessage>, AdapterError>;
}
