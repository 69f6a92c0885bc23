use std::{collections::HashSet, sync::Arc};

use {
    parley_service_traits::{GroupService, UserService},
    tracing::{debug, error},
};

use crate::{
    error::{Error, Result},
    types::{ChannelType, PresenceSummary},
};

/// Counts the online members of a channel.
#[derive(Clone)]
pub struct PresenceAggregator {
    groups: Arc<dyn GroupService>,
    users: Arc<dyn UserService>,
}

impl PresenceAggregator {
    pub fn new(groups: Arc<dyn GroupService>, users: Arc<dyn UserService>) -> Self {
        Self { groups, users }
    }

    /// Presence summary for a channel.
    ///
    /// Person channels report no count. For everything else the member list is
    /// fetched and all members' status is looked up in one batched call. A
    /// member online on several devices counts once, and status rows for
    /// non-members are ignored, so the count never exceeds the member count.
    pub async fn presence(
        &self,
        channel_id: &str,
        channel_type: ChannelType,
    ) -> Result<PresenceSummary> {
        if channel_type.is_person() {
            return Ok(PresenceSummary::default());
        }

        let members = self.groups.get_members(channel_id).await.map_err(|e| {
            error!(channel_id, %channel_type, error = %e, "failed to list channel members");
            Error::upstream("list channel members", e)
        })?;
        if members.is_empty() {
            return Ok(PresenceSummary::default());
        }

        let uids: Vec<String> = members.into_iter().map(|m| m.uid).collect();
        let statuses = self.users.get_online_status(&uids).await.map_err(|e| {
            error!(channel_id, %channel_type, error = %e, "failed to query member online status");
            Error::upstream("query member online status", e)
        })?;

        let member_set: HashSet<&str> = uids.iter().map(String::as_str).collect();
        let online: HashSet<&str> = statuses
            .iter()
            .filter(|s| s.online)
            .map(|s| s.uid.as_str())
            .filter(|uid| member_set.contains(uid))
            .collect();

        debug!(
            channel_id,
            %channel_type,
            members = member_set.len(),
            online = online.len(),
            "computed channel presence"
        );
        Ok(PresenceSummary::online(online.len()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::testing::FakeDirectory};

    fn aggregator(dir: &Arc<FakeDirectory>) -> PresenceAggregator {
        PresenceAggregator::new(dir.clone(), dir.clone())
    }

    #[tokio::test]
    async fn person_channel_skips_enumeration() {
        let dir = Arc::new(FakeDirectory::with_members(&["a", "b"]).status("a", 0, true));
        let summary = aggregator(&dir)
            .presence("u2", ChannelType::PERSON)
            .await
            .unwrap();
        assert_eq!(summary, PresenceSummary::default());
        assert_eq!(dir.member_calls.get(), 0);
        assert_eq!(dir.status_calls.get(), 0);
    }

    #[tokio::test]
    async fn counts_online_members() {
        let dir = Arc::new(
            FakeDirectory::with_members(&["A", "B", "C"])
                .status("A", 0, true)
                .status("B", 0, false)
                .status("C", 1, true),
        );
        let summary = aggregator(&dir)
            .presence("g1", ChannelType::GROUP)
            .await
            .unwrap();
        assert_eq!(summary.online_count, 2);
        assert_eq!(summary.signal_on, 0);
        assert_eq!(dir.status_calls.get(), 1);
    }

    #[tokio::test]
    async fn empty_group_skips_status_lookup() {
        let dir = Arc::new(FakeDirectory::default());
        let summary = aggregator(&dir)
            .presence("g1", ChannelType::GROUP)
            .await
            .unwrap();
        assert_eq!(summary.online_count, 0);
        assert_eq!(dir.member_calls.get(), 1);
        assert_eq!(dir.status_calls.get(), 0);
    }

    #[tokio::test]
    async fn multi_device_member_counts_once() {
        let dir = Arc::new(
            FakeDirectory::with_members(&["A", "B"])
                .status("A", 0, true)
                .status("A", 1, true)
                .status("A", 2, false),
        );
        let summary = aggregator(&dir)
            .presence("g1", ChannelType::GROUP)
            .await
            .unwrap();
        assert_eq!(summary.online_count, 1);
    }

    #[tokio::test]
    async fn non_member_statuses_are_ignored() {
        let dir = Arc::new(
            FakeDirectory::with_members(&["A"])
                .status("A", 0, true)
                .status("stranger", 0, true),
        );
        let summary = aggregator(&dir)
            .presence("g1", ChannelType::CUSTOMER_SERVICE)
            .await
            .unwrap();
        assert_eq!(summary.online_count, 1);
    }

    #[tokio::test]
    async fn member_failure_is_upstream() {
        let dir = Arc::new(FakeDirectory {
            fail_members: true,
            ..FakeDirectory::default()
        });
        let err = aggregator(&dir)
            .presence("g1", ChannelType::GROUP)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
        assert_eq!(err.public_message(), "list channel members");
        assert_eq!(dir.status_calls.get(), 0);
    }

    #[tokio::test]
    async fn status_failure_is_upstream() {
        let dir = Arc::new(FakeDirectory {
            fail_status: true,
            ..FakeDirectory::with_members(&["A", "B"])
        });
        let err = aggregator(&dir)
            .presence("g1", ChannelType::GROUP)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
        assert_eq!(err.public_message(), "query member online status");
    }
}
