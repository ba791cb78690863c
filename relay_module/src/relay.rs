//! Wiring from an inbound user message to the assistant and back out.

use assistant_module::AssistantClient;
use tracing::{error, info};

use crate::adapters::line::LineOutboundAdapter;
use crate::channel::InboundMessage;

/// Connects the completion retriever to the reply dispatcher.
pub struct RelayService {
    assistant: AssistantClient,
    outbound: LineOutboundAdapter,
}

impl RelayService {
    pub fn new(assistant: AssistantClient, outbound: LineOutboundAdapter) -> Self {
        Self {
            assistant,
            outbound,
        }
    }

    /// Produce and dispatch a reply for one inbound message.
    ///
    /// A failed retrieval is replaced by its fallback text so the user always
    /// hears back. Dispatch is best-effort: failures are logged, never
    /// propagated.
    pub async fn handle_message(&self, message: &InboundMessage) {
        let reply = match self.assistant.generate_reply(&message.text).await {
            Ok(text) => text,
            Err(err) => {
                error!("assistant retrieval failed: {}", err);
                err.fallback_text().to_string()
            }
        };

        match self.outbound.send_reply(&message.reply_token, &reply).await {
            Ok(result) if result.success => {
                info!(
                    "replied to message {}",
                    message.message_id.as_deref().unwrap_or("<unknown>")
                );
            }
            Ok(result) => {
                error!(
                    "reply rejected: {}",
                    result.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            Err(err) => {
                error!("reply dispatch failed: {}", err);
            }
        }
    }
}
