pub mod adapters;
pub mod channel;
pub mod config;
pub mod relay;

pub use config::{ConfigError, RelayConfig};
pub use relay::RelayService;
