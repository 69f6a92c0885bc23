//! Fake modules and collaborators shared by the unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use {
    async_trait::async_trait,
    parley_service_traits::{
        GroupInfo, GroupMember, GroupService, OnlineStatus, ServiceError, ServiceResult, UserInfo,
        UserService,
    },
};

use crate::{
    plugin::{ChannelModule, ChannelResolve, Resolution},
    store::{ChannelSetting, ChannelSettingStore},
    types::{ChannelDescriptor, ChannelRecord, ChannelType, ParentChannel},
};

#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

enum Behavior {
    Inert,
    Claims(ChannelType),
    Fails,
}

pub struct FakeModule {
    id: String,
    behavior: Behavior,
    parent: Option<ParentChannel>,
    calls: Calls,
}

impl FakeModule {
    pub fn inert(id: &str) -> Self {
        Self::build(id, Behavior::Inert)
    }

    pub fn claiming(id: &str, channel_type: ChannelType) -> Self {
        Self::build(id, Behavior::Claims(channel_type))
    }

    pub fn failing(id: &str) -> Self {
        Self::build(id, Behavior::Fails)
    }

    pub fn with_parent(mut self, parent: ParentChannel) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }

    fn build(id: &str, behavior: Behavior) -> Self {
        Self {
            id: id.into(),
            behavior,
            parent: None,
            calls: Calls::default(),
        }
    }
}

impl ChannelModule for FakeModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel_resolver(&self) -> Option<&dyn ChannelResolve> {
        match self.behavior {
            Behavior::Inert => None,
            _ => Some(self),
        }
    }
}

#[async_trait]
impl ChannelResolve for FakeModule {
    async fn resolve_channel(
        &self,
        channel: &ChannelDescriptor,
        _requester_uid: &str,
    ) -> anyhow::Result<Resolution> {
        self.calls.hit();
        match self.behavior {
            Behavior::Claims(owned) if owned == channel.channel_type => {
                let mut record = ChannelRecord::new(channel.clone(), self.id.clone());
                record.parent_channel = self.parent.clone();
                Ok(Resolution::Claimed(record))
            },
            Behavior::Fails => anyhow::bail!("{} backend unavailable", self.id),
            _ => Ok(Resolution::NotMine),
        }
    }
}

/// Settings store returning a fixed answer.
#[derive(Default)]
pub struct FakeSettings {
    pub parent: Option<ParentChannel>,
    pub fail: bool,
    pub calls: Calls,
}

#[async_trait]
impl ChannelSettingStore for FakeSettings {
    async fn get(&self, channel: &ChannelDescriptor) -> anyhow::Result<Option<ChannelSetting>> {
        self.calls.hit();
        if self.fail {
            anyhow::bail!("settings table locked");
        }
        Ok(self.parent.clone().map(|parent| ChannelSetting {
            channel: channel.clone(),
            parent: Some(parent),
        }))
    }
}

/// Settings store that must never be reached.
pub struct UnreachableSettings;

#[async_trait]
impl ChannelSettingStore for UnreachableSettings {
    async fn get(&self, channel: &ChannelDescriptor) -> anyhow::Result<Option<ChannelSetting>> {
        panic!("settings lookup for {channel} should not happen");
    }
}

/// Group and user directory with canned members and statuses.
#[derive(Default)]
pub struct FakeDirectory {
    pub members: Vec<String>,
    pub statuses: Vec<OnlineStatus>,
    pub fail_members: bool,
    pub fail_status: bool,
    pub member_calls: Calls,
    pub status_calls: Calls,
}

impl FakeDirectory {
    pub fn with_members(members: &[&str]) -> Self {
        Self {
            members: members.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn status(mut self, uid: &str, device_flag: u8, online: bool) -> Self {
        self.statuses.push(OnlineStatus {
            uid: uid.into(),
            device_flag,
            online,
            last_offline: 0,
        });
        self
    }
}

#[async_trait]
impl GroupService for FakeDirectory {
    async fn get_group(&self, _group_no: &str) -> ServiceResult<Option<GroupInfo>> {
        Ok(None)
    }

    async fn get_members(&self, _group_no: &str) -> ServiceResult<Vec<GroupMember>> {
        self.member_calls.hit();
        if self.fail_members {
            return Err(ServiceError::message("group_member query timed out"));
        }
        Ok(self
            .members
            .iter()
            .map(|uid| GroupMember {
                uid: uid.clone(),
                remark: String::new(),
                role: 0,
            })
            .collect())
    }
}

#[async_trait]
impl UserService for FakeDirectory {
    async fn get_user(&self, _uid: &str) -> ServiceResult<Option<UserInfo>> {
        Ok(None)
    }

    async fn get_online_status(&self, uids: &[String]) -> ServiceResult<Vec<OnlineStatus>> {
        self.status_calls.hit();
        assert!(!uids.is_empty(), "status lookup with an empty uid set");
        if self.fail_status {
            return Err(ServiceError::message("user_online query timed out"));
        }
        Ok(self.statuses.clone())
    }
}
