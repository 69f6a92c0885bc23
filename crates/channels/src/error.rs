use std::error::Error as StdError;

use crate::types::ChannelType;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors.
///
/// `context` names the failing sub-operation and is safe to show to callers;
/// `source` carries the detail and is only meant for logs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered module claimed the channel.
    #[error("channel not found: {channel_id}/{channel_type}")]
    NotFound {
        channel_id: String,
        channel_type: ChannelType,
    },

    /// A collaborator (business module, member or presence source) failed.
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Unexpected failure inside the gateway's own plumbing.
    #[error("{context}: {source}")]
    Internal {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Input payload or registration is invalid.
    #[error("invalid channel input: {message}")]
    InvalidInput { message: String },
}

impl Error {
    #[must_use]
    pub fn not_found(channel_id: impl Into<String>, channel_type: ChannelType) -> Self {
        Self::NotFound {
            channel_id: channel_id.into(),
            channel_type,
        }
    }

    #[must_use]
    pub fn upstream(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Upstream {
            context: context.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn internal(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            context: context.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    /// Message that can be returned to a caller without leaking backend detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "channel not found".into(),
            Self::Upstream { context, .. } | Self::Internal { context, .. } => context.clone(),
            Self::InvalidInput { message } => message.clone(),
        }
    }
}
