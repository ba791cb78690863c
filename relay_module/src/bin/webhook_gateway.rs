#[path = "webhook_gateway/handlers.rs"]
mod handlers;
#[path = "webhook_gateway/state.rs"]
mod state;
#[path = "webhook_gateway/verify.rs"]
mod verify;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

use assistant_module::AssistantClient;
use relay_module::adapters::line::LineOutboundAdapter;
use relay_module::relay::RelayService;
use relay_module::RelayConfig;

use handlers::{health, receive_line_webhook};
use state::GatewayState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_target(false).init();
    dotenvy::dotenv().ok();

    let config = RelayConfig::load()?;

    let assistant = AssistantClient::new(config.assistant_config());
    let outbound = LineOutboundAdapter::with_api_base(
        config.line_channel_access_token.clone(),
        config.line_api_base.clone(),
    );

    let state = Arc::new(GatewayState {
        channel_secret: config.line_channel_secret.clone(),
        relay: RelayService::new(assistant, outbound),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/line/webhook", post(receive_line_webhook))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let addr: std::net::SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("webhook gateway listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
