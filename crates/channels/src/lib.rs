//! Channel resolution and presence.
//!
//! Business modules implement [`ChannelModule`] and are registered once at
//! startup in a [`ModuleRegistry`]. The [`ChannelResolver`] asks them in
//! registration order which one owns a channel and enriches the winning
//! record with its parent link. The [`PresenceAggregator`] counts the online
//! members of a channel.

pub mod error;
pub mod plugin;
pub mod presence;
pub mod registry;
pub mod resolver;
pub mod store;
#[cfg(test)]
mod testing;
pub mod types;

pub use {
    error::{Error, Result},
    plugin::{ChannelModule, ChannelResolve, Resolution},
    presence::PresenceAggregator,
    registry::ModuleRegistry,
    resolver::ChannelResolver,
    store::{ChannelSetting, ChannelSettingStore},
    types::{ChannelDescriptor, ChannelRecord, ChannelType, ParentChannel, PresenceSummary},
};
