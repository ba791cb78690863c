use std::fmt;

use thiserror::Error;

use crate::client::RunStatus;

/// Protocol step an error was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateThread,
    AddMessage,
    CreateRun,
    PollRun,
    ListMessages,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::CreateThread => "thread creation",
            Stage::AddMessage => "message append",
            Stage::CreateRun => "run creation",
            Stage::PollRun => "run status poll",
            Stage::ListMessages => "message list",
        };
        f.write_str(label)
    }
}

impl Stage {
    fn fallback_text(&self) -> &'static str {
        match self {
            Stage::CreateThread => {
                "Sorry, I could not start a conversation with the assistant. Please try again."
            }
            Stage::AddMessage => {
                "Sorry, I could not deliver your message to the assistant. Please try again."
            }
            Stage::CreateRun => {
                "Sorry, I could not ask the assistant for a reply. Please try again."
            }
            Stage::PollRun => {
                "Sorry, I could not check on the assistant's progress. Please try again."
            }
            Stage::ListMessages => {
                "Sorry, I could not read the assistant's reply. Please try again."
            }
        }
    }
}

/// Failure kinds of a reply retrieval.
///
/// Success and failure share a return channel only at the dispatch boundary,
/// where callers substitute `fallback_text()` for the reply; everywhere else
/// the typed variant stays available.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{stage} request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
    #[error("{stage} returned HTTP {status}: {body}")]
    Status {
        stage: Stage,
        status: u16,
        body: String,
    },
    #[error("{stage} response missing {field}")]
    MissingField { stage: Stage, field: &'static str },
    #[error("assistant run ended as {status}")]
    RunFailed { status: RunStatus },
    #[error("could not read reply text from the messages payload")]
    MalformedReply,
}

impl AssistantError {
    /// Human-readable text a dispatcher sends in place of the reply when the
    /// retrieval fails.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            AssistantError::Transport { stage, .. }
            | AssistantError::Status { stage, .. }
            | AssistantError::MissingField { stage, .. } => stage.fallback_text(),
            AssistantError::RunFailed { .. } => {
                "Sorry, the assistant could not finish answering your message. Please try again."
            }
            AssistantError::MalformedReply => {
                "Sorry, I received a reply I could not read. Please try again."
            }
        }
    }
}
