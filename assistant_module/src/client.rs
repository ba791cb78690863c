//! HTTP client for the assistants conversation API.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::errors::{AssistantError, Stage};
use crate::extract::{extract_reply, MessageList};

/// Beta-feature header pinning the protocol revision this client speaks.
const BETA_HEADER_NAME: &str = "OpenAI-Beta";
const BETA_HEADER_VALUE: &str = "assistants=v2";

/// Lifecycle state of one assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    /// Any other status the server may report; treated as non-terminal.
    #[serde(other)]
    Other,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        matches!(self, RunStatus::Completed)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, RunStatus::Failed | RunStatus::Cancelled)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Other => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Deserialize)]
struct ObjectRef {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunState {
    status: RunStatus,
}

/// Client for the threads/messages/runs protocol.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post_json(
        &self,
        stage: Stage,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String, AssistantError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header(BETA_HEADER_NAME, BETA_HEADER_VALUE)
            .timeout(self.config.http_timeout)
            .json(body)
            .send()
            .await
            .map_err(|source| AssistantError::Transport { stage, source })?;
        Self::read_success(stage, response).await
    }

    async fn get(&self, stage: Stage, path: &str) -> Result<String, AssistantError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header(BETA_HEADER_NAME, BETA_HEADER_VALUE)
            .timeout(self.config.http_timeout)
            .send()
            .await
            .map_err(|source| AssistantError::Transport { stage, source })?;
        Self::read_success(stage, response).await
    }

    async fn read_success(
        stage: Stage,
        response: reqwest::Response,
    ) -> Result<String, AssistantError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| AssistantError::Transport { stage, source })?;
        if !status.is_success() {
            return Err(AssistantError::Status {
                stage,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Open a new conversation thread.
    pub async fn create_thread(&self) -> Result<String, AssistantError> {
        let body = self
            .post_json(Stage::CreateThread, "/threads", &serde_json::json!({}))
            .await?;
        parse_id(Stage::CreateThread, &body)
    }

    /// Append a user message to a thread.
    pub async fn add_message(&self, thread_id: &str, text: &str) -> Result<(), AssistantError> {
        self.post_json(
            Stage::AddMessage,
            &format!("/threads/{thread_id}/messages"),
            &serde_json::json!({"role": "user", "content": text}),
        )
        .await?;
        Ok(())
    }

    /// Start a run of the configured assistant against a thread.
    pub async fn create_run(&self, thread_id: &str) -> Result<String, AssistantError> {
        let body = self
            .post_json(
                Stage::CreateRun,
                &format!("/threads/{thread_id}/runs"),
                &serde_json::json!({"assistant_id": self.config.assistant_id}),
            )
            .await?;
        parse_id(Stage::CreateRun, &body)
    }

    /// Fetch the current status of a run.
    pub async fn run_status(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<RunStatus, AssistantError> {
        let body = self
            .get(Stage::PollRun, &format!("/threads/{thread_id}/runs/{run_id}"))
            .await?;
        let run: RunState = serde_json::from_str(&body).map_err(|_| AssistantError::MissingField {
            stage: Stage::PollRun,
            field: "status",
        })?;
        Ok(run.status)
    }

    /// List a thread's messages.
    pub async fn list_messages(&self, thread_id: &str) -> Result<MessageList, AssistantError> {
        let body = self
            .get(Stage::ListMessages, &format!("/threads/{thread_id}/messages"))
            .await?;
        serde_json::from_str(&body).map_err(|_| AssistantError::MalformedReply)
    }

    /// Produce the assistant's reply to one user message.
    ///
    /// Drives the full protocol: thread, message, run, bounded status poll,
    /// message list, extraction. Messages are never read before the run is
    /// observed terminal or the poll budget is exhausted; an exhausted budget
    /// still gets a single best-effort read.
    pub async fn generate_reply(&self, user_text: &str) -> Result<String, AssistantError> {
        let thread_id = self.create_thread().await?;
        debug!("created thread {}", thread_id);

        self.add_message(&thread_id, user_text).await?;

        let run_id = self.create_run(&thread_id).await?;
        debug!("started run {} on thread {}", run_id, thread_id);

        let mut completed = false;
        for attempt in 1..=self.config.poll_attempts {
            tokio::time::sleep(self.config.poll_interval).await;
            let status = self.run_status(&thread_id, &run_id).await?;
            debug!("run {} status on poll {}: {}", run_id, attempt, status);
            if status.is_success() {
                completed = true;
                break;
            }
            if status.is_failure() {
                return Err(AssistantError::RunFailed { status });
            }
        }
        if !completed {
            warn!(
                "run {} not complete after {} polls, reading messages anyway",
                run_id, self.config.poll_attempts
            );
        }

        let list = self.list_messages(&thread_id).await?;
        extract_reply(&list)
    }
}

fn parse_id(stage: Stage, body: &str) -> Result<String, AssistantError> {
    serde_json::from_str::<ObjectRef>(body)
        .ok()
        .and_then(|object| object.id)
        .filter(|id| !id.is_empty())
        .ok_or(AssistantError::MissingField { stage, field: "id" })
}
