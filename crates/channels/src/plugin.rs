use {anyhow::Result, async_trait::async_trait};

use crate::types::{ChannelDescriptor, ChannelRecord};

/// Outcome of asking one module about a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The module owns the channel; dispatch stops here.
    Claimed(ChannelRecord),
    /// Not this module's channel; dispatch moves on to the next module.
    NotMine,
}

/// A business module (one-to-one chat, groups, customer service, ...).
///
/// Modules are registered once at startup. Each one exposes the capabilities
/// it has; the core never needs to know the concrete module types.
pub trait ChannelModule: Send + Sync {
    /// Module identifier (e.g. "user", "group").
    fn id(&self) -> &str;

    /// Human-readable module name.
    fn name(&self) -> &str {
        self.id()
    }

    /// Channel resolution capability, if this module owns any channels.
    fn channel_resolver(&self) -> Option<&dyn ChannelResolve>;
}

/// Resolve a channel owned by this module.
#[async_trait]
pub trait ChannelResolve: Send + Sync {
    /// Return [`Resolution::NotMine`] for channels this module does not own.
    /// An `Err` aborts the whole lookup, so reserve it for real failures.
    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
        requester_uid: &str,
    ) -> Result<Resolution>;
}
