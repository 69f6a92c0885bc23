use std::sync::Arc;

use tracing::{error, warn};

use crate::{
    error::{Error, Result},
    registry::ModuleRegistry,
    store::ChannelSettingStore,
    types::{ChannelDescriptor, ChannelRecord, ChannelType},
};

/// Resolves a channel through the module registry and attaches its parent link.
#[derive(Clone)]
pub struct ChannelResolver {
    registry: Arc<ModuleRegistry>,
    settings: Arc<dyn ChannelSettingStore>,
}

impl ChannelResolver {
    pub fn new(registry: Arc<ModuleRegistry>, settings: Arc<dyn ChannelSettingStore>) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Resolve `channel_id`/`channel_type` on behalf of `requester_uid`.
    ///
    /// Settings are only read once a module has claimed the channel. A parent
    /// supplied by the module itself is left untouched.
    pub async fn resolve(
        &self,
        channel_id: &str,
        channel_type: ChannelType,
        requester_uid: &str,
    ) -> Result<ChannelRecord> {
        let channel = ChannelDescriptor::new(channel_id, channel_type);

        let mut record = match self.registry.dispatch(&channel, requester_uid).await {
            Ok(record) => record,
            Err(e @ Error::NotFound { .. }) => {
                warn!(channel_id, %channel_type, "channel not found");
                return Err(e);
            },
            Err(e) => return Err(e),
        };

        let setting = self.settings.get(&channel).await.map_err(|e| {
            error!(channel_id, %channel_type, error = %e, "failed to query channel settings");
            Error::internal("query channel settings", e)
        })?;

        if record.parent_channel.is_none() {
            record.parent_channel = setting.and_then(|s| s.parent);
        }

        Ok(record)
    }
}
