use {anyhow::Result, async_trait::async_trait, serde::Serialize};

use crate::types::{ChannelDescriptor, ParentChannel};

/// Per-channel settings kept outside the owning module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSetting {
    pub channel: ChannelDescriptor,
    /// At most one parent per channel.
    pub parent: Option<ParentChannel>,
}

/// Read access to channel settings, keyed by `(channel_id, channel_type)`.
#[async_trait]
pub trait ChannelSettingStore: Send + Sync {
    async fn get(&self, channel: &ChannelDescriptor) -> Result<Option<ChannelSetting>>;
}
