use relay_module::relay::RelayService;

pub(super) struct GatewayState {
    /// Channel secret for webhook signature verification; verification is
    /// skipped when absent.
    pub(super) channel_secret: Option<String>,
    pub(super) relay: RelayService,
}
