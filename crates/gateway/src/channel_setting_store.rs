use {anyhow::Result, async_trait::async_trait, sqlx::SqlitePool};

use parley_channels::{ChannelDescriptor, ChannelSetting, ChannelSettingStore, ParentChannel};

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct ChannelSettingRow {
    parent_channel_id: String,
    parent_channel_type: i64,
}

impl ChannelSettingRow {
    fn into_setting(self, channel: &ChannelDescriptor) -> ChannelSetting {
        // An empty parent id means "row exists, no parent".
        let parent = (!self.parent_channel_id.is_empty()).then(|| ParentChannel {
            channel_id: self.parent_channel_id,
            channel_type: u8::try_from(self.parent_channel_type)
                .unwrap_or_default()
                .into(),
        });
        ChannelSetting {
            channel: channel.clone(),
            parent,
        }
    }
}

/// SQLite-backed channel settings.
pub struct SqliteChannelSettingStore {
    pool: SqlitePool,
}

impl SqliteChannelSettingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `channel_setting` table if it does not exist yet.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS channel_setting (
                channel_id          TEXT    NOT NULL,
                channel_type        INTEGER NOT NULL,
                parent_channel_id   TEXT    NOT NULL DEFAULT '',
                parent_channel_type INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (channel_id, channel_type)
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ChannelSettingStore for SqliteChannelSettingStore {
    async fn get(&self, channel: &ChannelDescriptor) -> Result<Option<ChannelSetting>> {
        let row = sqlx::query_as::<_, ChannelSettingRow>(
            "SELECT parent_channel_id, parent_channel_type FROM channel_setting
             WHERE channel_id = ? AND channel_type = ?",
        )
        .bind(&channel.channel_id)
        .bind(i64::from(channel.channel_type.0))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_setting(channel)))
    }
}
