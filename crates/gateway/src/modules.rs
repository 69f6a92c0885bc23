//! Built-in business modules and the startup registry.
//!
//! The person module owns one-to-one channels (the channel id is the peer's
//! uid); the group module owns group channels (the channel id is the group
//! number). Deployments with more channel kinds register extra modules after
//! these.

use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    parley_channels::{
        ChannelDescriptor, ChannelModule, ChannelRecord, ChannelResolve, ChannelType,
        ModuleRegistry, Resolution,
    },
    parley_service_traits::{GroupService, UserService},
};

pub struct PersonChannelModule {
    users: Arc<dyn UserService>,
}

impl PersonChannelModule {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

impl ChannelModule for PersonChannelModule {
    fn id(&self) -> &str {
        "user"
    }

    fn name(&self) -> &str {
        "Users"
    }

    fn channel_resolver(&self) -> Option<&dyn ChannelResolve> {
        Some(self)
    }
}

#[async_trait]
impl ChannelResolve for PersonChannelModule {
    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
        _requester_uid: &str,
    ) -> Result<Resolution> {
        if channel.channel_type != ChannelType::PERSON {
            return Ok(Resolution::NotMine);
        }
        let Some(user) = self.users.get_user(&channel.channel_id).await? else {
            return Ok(Resolution::NotMine);
        };

        let statuses = self
            .users
            .get_online_status(std::slice::from_ref(&user.uid))
            .await?;
        let online = statuses.iter().find(|s| s.online);
        let last_offline = statuses.iter().map(|s| s.last_offline).max().unwrap_or(0);

        let mut record = ChannelRecord::new(channel.clone(), user.name);
        record.logo = user.avatar;
        record.robot = u8::from(user.robot);
        record.category = user.category;
        record.status = 1;
        record.online = u8::from(online.is_some());
        record.device_flag = online.map_or(0, |s| s.device_flag);
        record.last_offline = last_offline;
        Ok(Resolution::Claimed(record))
    }
}

pub struct GroupChannelModule {
    groups: Arc<dyn GroupService>,
}

impl GroupChannelModule {
    pub fn new(groups: Arc<dyn GroupService>) -> Self {
        Self { groups }
    }
}

impl ChannelModule for GroupChannelModule {
    fn id(&self) -> &str {
        "group"
    }

    fn name(&self) -> &str {
        "Groups"
    }

    fn channel_resolver(&self) -> Option<&dyn ChannelResolve> {
        Some(self)
    }
}

#[async_trait]
impl ChannelResolve for GroupChannelModule {
    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
        _requester_uid: &str,
    ) -> Result<Resolution> {
        if channel.channel_type != ChannelType::GROUP {
            return Ok(Resolution::NotMine);
        }
        let Some(group) = self.groups.get_group(&channel.channel_id).await? else {
            return Ok(Resolution::NotMine);
        };

        let mut record = ChannelRecord::new(channel.clone(), group.name);
        record.logo = group.avatar;
        record.notice = group.notice;
        record.status = group.status;
        record.category = group.category;
        record.receipt = 1;
        Ok(Resolution::Claimed(record))
    }
}

/// Registry with the built-in modules, person first.
pub fn default_registry(
    users: Arc<dyn UserService>,
    groups: Arc<dyn GroupService>,
) -> parley_channels::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry.register(Box::new(PersonChannelModule::new(users)))?;
    registry.register(Box::new(GroupChannelModule::new(groups)))?;
    Ok(registry)
}
