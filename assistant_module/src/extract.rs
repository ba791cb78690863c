//! Reply extraction from a thread's message list.
//!
//! The upstream API changed its list envelope between revisions: current
//! servers group entries under `data` (newest first, role-tagged), older
//! ones under `messages` (reply last, no roles). Both shapes are accepted;
//! anything else is a malformed reply.

use serde::Deserialize;

use crate::errors::{AssistantError, Stage};

/// Message list payload returned by the list-messages operation.
#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Option<Vec<ThreadMessage>>,
    #[serde(default)]
    pub messages: Option<Vec<ThreadMessage>>,
}

/// One message on a thread.
#[derive(Debug, Deserialize)]
pub struct ThreadMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Message content is either a bare string or an ordered list of typed
/// content blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<BlockText>,
}

/// A block's `text` field carries either the string itself or a nested
/// `{ "value": ... }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BlockText {
    Plain(String),
    Nested { value: String },
}

/// Locate the assistant's reply text in a message list.
///
/// Under `data` the first assistant-role entry wins (the API lists newest
/// first); under `messages` the last entry is taken as-is.
pub fn extract_reply(list: &MessageList) -> Result<String, AssistantError> {
    let message = if let Some(data) = &list.data {
        data.iter()
            .find(|entry| entry.role.as_deref() == Some("assistant"))
            .ok_or(AssistantError::MissingField {
                stage: Stage::ListMessages,
                field: "assistant reply",
            })?
    } else if let Some(messages) = &list.messages {
        messages.last().ok_or(AssistantError::MissingField {
            stage: Stage::ListMessages,
            field: "messages",
        })?
    } else {
        return Err(AssistantError::MissingField {
            stage: Stage::ListMessages,
            field: "data",
        });
    };

    let content = message.content.as_ref().ok_or(AssistantError::MalformedReply)?;
    match content {
        MessageContent::Text(text) => Ok(text.clone()),
        MessageContent::Blocks(blocks) => {
            let block = blocks
                .iter()
                .find(|block| block.kind.as_deref().map_or(true, |kind| kind == "text"))
                .ok_or(AssistantError::MalformedReply)?;
            match block.text.as_ref().ok_or(AssistantError::MalformedReply)? {
                BlockText::Plain(text) => Ok(text.clone()),
                BlockText::Nested { value } => Ok(value.clone()),
            }
        }
    }
}
