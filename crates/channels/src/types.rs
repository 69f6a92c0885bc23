use std::{fmt, num::IntErrorKind};

use serde::{Deserialize, Serialize};

/// Channel type code as carried on the wire.
///
/// Only [`ChannelType::PERSON`] has special meaning to the core: it marks a
/// two-party conversation. Every other code is a multi-member channel whose
/// owner is whichever business module claims it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelType(pub u8);

impl ChannelType {
    pub const PERSON: Self = Self(1);
    pub const GROUP: Self = Self(2);
    pub const CUSTOMER_SERVICE: Self = Self(3);

    #[must_use]
    pub fn is_person(self) -> bool {
        self == Self::PERSON
    }

    /// Parse a type code from a path segment or query value.
    ///
    /// Out-of-range numbers saturate to `i64::MAX`/`i64::MIN`, anything else
    /// that is not a decimal `i64` becomes `0`, and the result is truncated to
    /// the low 8 bits. Existing clients depend on this, so garbage is coerced
    /// rather than rejected.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let wide = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 0,
            },
        };
        Self(wide as u8)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Identity of a channel. Built per request, never persisted by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub channel_id: String,
    pub channel_type: ChannelType,
}

impl ChannelDescriptor {
    pub fn new(channel_id: impl Into<String>, channel_type: impl Into<ChannelType>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_type: channel_type.into(),
        }
    }
}

impl fmt::Display for ChannelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.channel_type)
    }
}

/// Link from a channel to the channel it is nested under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentChannel {
    pub channel_id: String,
    pub channel_type: ChannelType,
}

/// Resolved view of a channel, produced by the module that owns it.
///
/// Fields a module has no opinion on stay at their defaults. Module-specific
/// data goes into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel: ChannelDescriptor,
    /// Attached by the resolver from the settings store unless the module set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_channel: Option<ParentChannel>,
    pub name: String,
    pub logo: String,
    pub remark: String,
    pub status: i32,
    pub online: u8,
    pub last_offline: i64,
    pub device_flag: u8,
    pub receipt: u8,
    pub robot: u8,
    pub category: String,
    pub stick: u8,
    pub mute: u8,
    pub notice: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChannelRecord {
    pub fn new(channel: ChannelDescriptor, name: impl Into<String>) -> Self {
        Self {
            channel,
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Live presence of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSummary {
    /// Reserved; always 0. Kept because clients read the field.
    pub signal_on: u8,
    pub online_count: usize,
}

impl PresenceSummary {
    #[must_use]
    pub fn online(online_count: usize) -> Self {
        Self {
            signal_on: 0,
            online_count,
        }
    }
}
