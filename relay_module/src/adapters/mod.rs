//! Channel adapters for messaging platforms.

pub mod line;

pub use line::{LineInboundAdapter, LineOutboundAdapter, LineWebhookPayload};
