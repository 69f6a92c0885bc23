//! Service trait interfaces for the user and group directories.
//!
//! Each trait has a `Noop` implementation that returns empty responses,
//! allowing the gateway to run standalone before a real directory is wired in.

use {async_trait::async_trait, serde::Serialize, tracing::debug};

/// Error type returned by service methods.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Message { message: String },
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ServiceError {
    #[must_use]
    pub fn message(message: impl std::fmt::Display) -> Self {
        Self::Message {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn backend(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// ── Users ───────────────────────────────────────────────────────────────────

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub uid: String,
    pub name: String,
    pub avatar: String,
    pub robot: bool,
    pub category: String,
}

/// Online state of one user on one device.
///
/// A user connected from several devices has one entry per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineStatus {
    pub uid: String,
    pub device_flag: u8,
    pub online: bool,
    /// Unix seconds of the last disconnect, 0 if never seen.
    pub last_offline: i64,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, uid: &str) -> ServiceResult<Option<UserInfo>>;

    /// Batched online lookup. Unknown uids are simply absent from the result.
    async fn get_online_status(&self, uids: &[String]) -> ServiceResult<Vec<OnlineStatus>>;
}

pub struct NoopUserService;

#[async_trait]
impl UserService for NoopUserService {
    async fn get_user(&self, uid: &str) -> ServiceResult<Option<UserInfo>> {
        debug!(uid, "user service not configured");
        Ok(None)
    }

    async fn get_online_status(&self, _uids: &[String]) -> ServiceResult<Vec<OnlineStatus>> {
        Ok(Vec::new())
    }
}

// ── Groups ──────────────────────────────────────────────────────────────────

/// Descriptive record of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub group_no: String,
    pub name: String,
    pub avatar: String,
    pub notice: String,
    /// 1 = normal, 2 = disbanded.
    pub status: i32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub uid: String,
    pub remark: String,
    /// 0 = member, 1 = owner, 2 = manager.
    pub role: i32,
}

#[async_trait]
pub trait GroupService: Send + Sync {
    async fn get_group(&self, group_no: &str) -> ServiceResult<Option<GroupInfo>>;

    /// Current (non-deleted) members of a group, in no particular order.
    async fn get_members(&self, group_no: &str) -> ServiceResult<Vec<GroupMember>>;
}

pub struct NoopGroupService;

#[async_trait]
impl GroupService for NoopGroupService {
    async fn get_group(&self, group_no: &str) -> ServiceResult<Option<GroupInfo>> {
        debug!(group_no, "group service not configured");
        Ok(None)
    }

    async fn get_members(&self, _group_no: &str) -> ServiceResult<Vec<GroupMember>> {
        Ok(Vec::new())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_services_return_empty() {
        assert!(NoopUserService.get_user("u1").await.unwrap().is_none());
        assert!(
            NoopUserService
                .get_online_status(&["u1".into()])
                .await
                .unwrap()
                .is_empty()
        );
        assert!(NoopGroupService.get_group("g1").await.unwrap().is_none());
        assert!(NoopGroupService.get_members("g1").await.unwrap().is_empty());
    }

    #[test]
    fn backend_error_keeps_source() {
        let err = ServiceError::backend("query group_member", "connection reset");
        assert_eq!(err.to_string(), "query group_member: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}
