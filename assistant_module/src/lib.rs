//! Client for a hosted assistants conversation API with asynchronous runs.
//!
//! Turning a user message into a reply takes a short protocol dance:
//! - open a thread, append the user message, start a run
//! - poll the run status until it reaches a terminal state (bounded)
//! - list the thread's messages and extract the assistant's reply text
//!
//! `AssistantClient::generate_reply` drives the whole sequence; the
//! individual API operations are also exposed for callers that need them.

pub mod client;
pub mod config;
pub mod errors;
pub mod extract;

pub use client::{AssistantClient, RunStatus};
pub use config::AssistantConfig;
pub use errors::{AssistantError, Stage};
