//! SQLite-backed user/group directory.
//!
//! Read-only from the gateway's point of view: rows are written by the
//! account, group and connection services that share the database.

use {
    anyhow::Result,
    async_trait::async_trait,
    parley_service_traits::{
        GroupInfo, GroupMember, GroupService, OnlineStatus, ServiceError, ServiceResult, UserInfo,
        UserService,
    },
    sqlx::{QueryBuilder, Sqlite, SqlitePool},
};

use crate::auth::TokenStore;

/// Upper bound on uids bound into a single `IN (...)` query.
const ONLINE_QUERY_CHUNK: usize = 500;

#[derive(sqlx::FromRow)]
struct UserRow {
    uid: String,
    name: String,
    avatar: String,
    robot: i64,
    category: String,
}

impl From<UserRow> for UserInfo {
    fn from(r: UserRow) -> Self {
        Self {
            uid: r.uid,
            name: r.name,
            avatar: r.avatar,
            robot: r.robot != 0,
            category: r.category,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OnlineRow {
    uid: String,
    device_flag: i64,
    online: i64,
    last_offline: i64,
}

impl From<OnlineRow> for OnlineStatus {
    fn from(r: OnlineRow) -> Self {
        Self {
            uid: r.uid,
            device_flag: u8::try_from(r.device_flag).unwrap_or_default(),
            online: r.online == 1,
            last_offline: r.last_offline,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    group_no: String,
    name: String,
    avatar: String,
    notice: String,
    status: i64,
    category: String,
}

impl From<GroupRow> for GroupInfo {
    fn from(r: GroupRow) -> Self {
        Self {
            group_no: r.group_no,
            name: r.name,
            avatar: r.avatar,
            notice: r.notice,
            status: i32::try_from(r.status).unwrap_or_default(),
            category: r.category,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    uid: String,
    remark: String,
    role: i64,
}

impl From<MemberRow> for GroupMember {
    fn from(r: MemberRow) -> Self {
        Self {
            uid: r.uid,
            remark: r.remark,
            role: i32::try_from(r.role).unwrap_or_default(),
        }
    }
}

fn backend(context: &'static str) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |e| ServiceError::backend(context, e)
}

/// Users, groups, memberships, online status and session tokens.
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the directory tables if they do not exist yet.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"CREATE TABLE IF NOT EXISTS user (
                uid      TEXT    PRIMARY KEY,
                name     TEXT    NOT NULL DEFAULT '',
                avatar   TEXT    NOT NULL DEFAULT '',
                robot    INTEGER NOT NULL DEFAULT 0,
                category TEXT    NOT NULL DEFAULT ''
            )"#,
            r#"CREATE TABLE IF NOT EXISTS user_token (
                token      TEXT    PRIMARY KEY,
                uid        TEXT    NOT NULL,
                created_at INTEGER NOT NULL DEFAULT 0
            )"#,
            r#"CREATE TABLE IF NOT EXISTS user_online (
                uid          TEXT    NOT NULL,
                device_flag  INTEGER NOT NULL DEFAULT 0,
                online       INTEGER NOT NULL DEFAULT 0,
                last_offline INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (uid, device_flag)
            )"#,
            r#"CREATE TABLE IF NOT EXISTS chat_group (
                group_no TEXT    PRIMARY KEY,
                name     TEXT    NOT NULL DEFAULT '',
                avatar   TEXT    NOT NULL DEFAULT '',
                notice   TEXT    NOT NULL DEFAULT '',
                status   INTEGER NOT NULL DEFAULT 1,
                category TEXT    NOT NULL DEFAULT ''
            )"#,
            r#"CREATE TABLE IF NOT EXISTS chat_group_member (
                group_no   TEXT    NOT NULL,
                uid        TEXT    NOT NULL,
                remark     TEXT    NOT NULL DEFAULT '',
                role       INTEGER NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (group_no, uid)
            )"#,
        ];
        for sql in statements {
            sqlx::query(sql).execute(pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for SqliteDirectory {
    async fn get_user(&self, uid: &str) -> ServiceResult<Option<UserInfo>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT uid, name, avatar, robot, category FROM user WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("query user"))?;
        Ok(row.map(Into::into))
    }

    async fn get_online_status(&self, uids: &[String]) -> ServiceResult<Vec<OnlineStatus>> {
        let mut statuses = Vec::new();
        for chunk in uids.chunks(ONLINE_QUERY_CHUNK) {
            let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
                "SELECT uid, device_flag, online, last_offline FROM user_online WHERE uid IN (",
            );
            let mut list = query.separated(", ");
            for uid in chunk {
                list.push_bind(uid);
            }
            list.push_unseparated(")");

            let rows = query
                .build_query_as::<OnlineRow>()
                .fetch_all(&self.pool)
                .await
                .map_err(backend("query user_online"))?;
            statuses.extend(rows.into_iter().map(OnlineStatus::from));
        }
        Ok(statuses)
    }
}

#[async_trait]
impl GroupService for SqliteDirectory {
    async fn get_group(&self, group_no: &str) -> ServiceResult<Option<GroupInfo>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT group_no, name, avatar, notice, status, category FROM chat_group WHERE group_no = ?",
        )
        .bind(group_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("query chat_group"))?;
        Ok(row.map(Into::into))
    }

    async fn get_members(&self, group_no: &str) -> ServiceResult<Vec<GroupMember>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT uid, remark, role FROM chat_group_member WHERE group_no = ? AND is_deleted = 0",
        )
        .bind(group_no)
        .fetch_all(&self.pool)
        .await
        .map_err(backend("query chat_group_member"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TokenStore for SqliteDirectory {
    async fn uid_for_token(&self, token: &str) -> Result<Option<String>> {
        let uid = sqlx::query_scalar::<_, String>("SELECT uid FROM user_token WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(uid)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn directory() -> SqliteDirectory {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteDirectory::init(&pool).await.unwrap();
        for sql in [
            "INSERT INTO user (uid, name, robot) VALUES ('alice', 'Alice', 0), ('bot', 'Bot', 1)",
            "INSERT INTO user_token (token, uid) VALUES ('t-alice', 'alice')",
            "INSERT INTO user_online (uid, device_flag, online, last_offline) VALUES
                ('alice', 0, 1, 0), ('alice', 1, 0, 1700000000), ('bob', 0, 0, 1690000000)",
            "INSERT INTO chat_group (group_no, name, notice) VALUES ('g1', 'Rustaceans', 'hi')",
            "INSERT INTO chat_group_member (group_no, uid, role, is_deleted) VALUES
                ('g1', 'alice', 1, 0), ('g1', 'bob', 0, 0), ('g1', 'mallory', 0, 1)",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        SqliteDirectory::new(pool)
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteDirectory::init(&pool).await.unwrap();
        SqliteDirectory::init(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn looks_up_users() {
        let dir = directory().await;
        let bot = dir.get_user("bot").await.unwrap().unwrap();
        assert!(bot.robot);
        assert_eq!(bot.name, "Bot");
        assert!(dir.get_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn members_exclude_deleted() {
        let dir = directory().await;
        let mut uids: Vec<_> = dir
            .get_members("g1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.uid)
            .collect();
        uids.sort();
        assert_eq!(uids, vec!["alice", "bob"]);
        assert!(dir.get_members("g2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn online_status_per_device() {
        let dir = directory().await;
        let statuses = dir
            .get_online_status(&["alice".into(), "bob".into(), "ghost".into()])
            .await
            .unwrap();
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses.iter().filter(|s| s.online).count(), 1);
        assert!(statuses.iter().all(|s| s.uid != "ghost"));
    }

    #[tokio::test]
    async fn online_status_spans_chunks() {
        let dir = directory().await;
        let mut uids: Vec<String> = (0..ONLINE_QUERY_CHUNK * 2)
            .map(|i| format!("filler-{i}"))
            .collect();
        uids.push("alice".into());
        let statuses = dir.get_online_status(&uids).await.unwrap();
        assert_eq!(statuses.len(), 2);
    }

    #[tokio::test]
    async fn empty_uid_list_issues_no_query() {
        let dir = directory().await;
        assert!(dir.get_online_status(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn groups_and_tokens() {
        let dir = directory().await;
        let group = dir.get_group("g1").await.unwrap().unwrap();
        assert_eq!(group.name, "Rustaceans");
        assert_eq!(group.status, 1);
        assert_eq!(
            dir.uid_for_token("t-alice").await.unwrap().as_deref(),
            Some("alice")
        );
        assert!(dir.uid_for_token("forged").await.unwrap().is_none());
    }
}
