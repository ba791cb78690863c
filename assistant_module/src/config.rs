use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one assistant client, built once at process start and passed
/// in rather than read from ambient environment.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// API base URL, overridable so tests can point at a local mock server.
    pub api_base: String,
    /// Bearer token for the assistants API.
    pub api_key: String,
    /// Identifier of the assistant that answers user messages.
    pub assistant_id: String,
    /// Maximum number of run status polls per retrieval.
    pub poll_attempts: u32,
    /// Delay before each run status poll.
    pub poll_interval: Duration,
    /// Per-request timeout toward the API.
    pub http_timeout: Duration,
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}
