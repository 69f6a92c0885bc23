use std::sync::Arc;

use parley_channels::{ChannelResolver, PresenceAggregator};

use crate::auth::{ResolvedAuth, TokenStore};

/// Shared, read-only gateway state handed to every request handler.
pub struct GatewayState {
    pub resolver: ChannelResolver,
    pub presence: PresenceAggregator,
    pub tokens: Arc<dyn TokenStore>,
    pub auth: ResolvedAuth,
    pub version: String,
}

impl GatewayState {
    pub fn new(
        resolver: ChannelResolver,
        presence: PresenceAggregator,
        tokens: Arc<dyn TokenStore>,
        auth: ResolvedAuth,
    ) -> Arc<Self> {
        Arc::new(Self {
            resolver,
            presence,
            tokens,
            auth,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
