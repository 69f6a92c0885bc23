use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    plugin::{ChannelModule, Resolution},
    types::{ChannelDescriptor, ChannelRecord},
};

/// Ordered registry of business modules.
///
/// Filled during startup composition, then shared read-only (usually behind
/// an `Arc`). Registration order is dispatch order.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn ChannelModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. Ids must be unique.
    pub fn register(&mut self, module: Box<dyn ChannelModule>) -> Result<()> {
        if self.get(module.id()).is_some() {
            return Err(Error::invalid_input(format!(
                "module `{}` is already registered",
                module.id()
            )));
        }
        debug!(
            module = module.id(),
            name = module.name(),
            resolves_channels = module.channel_resolver().is_some(),
            "registered module"
        );
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn ChannelModule> {
        self.modules
            .iter()
            .find(|m| m.id() == id)
            .map(|m| m.as_ref())
    }

    /// Module ids in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    pub fn modules(&self) -> impl Iterator<Item = &dyn ChannelModule> {
        self.modules.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Ask each module that can resolve channels, in order, until one claims
    /// `channel`.
    ///
    /// A module error stops the walk: later modules are not consulted.
    pub async fn dispatch(
        &self,
        channel: &ChannelDescriptor,
        requester_uid: &str,
    ) -> Result<ChannelRecord> {
        for module in self.modules() {
            let Some(resolver) = module.channel_resolver() else {
                continue;
            };
            match resolver.resolve_channel(channel, requester_uid).await {
                Ok(Resolution::Claimed(record)) => {
                    debug!(module = module.id(), %channel, "channel claimed");
                    return Ok(record);
                },
                Ok(Resolution::NotMine) => {},
                Err(e) => {
                    warn!(
                        module = module.id(),
                        channel_id = %channel.channel_id,
                        channel_type = %channel.channel_type,
                        error = %e,
                        "module failed to resolve channel"
                    );
                    return Err(Error::upstream(
                        format!("resolve channel via module `{}`", module.id()),
                        e,
                    ));
                },
            }
        }
        Err(Error::not_found(
            channel.channel_id.clone(),
            channel.channel_type,
        ))
    }
}
