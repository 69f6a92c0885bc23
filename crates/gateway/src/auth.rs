use {anyhow::Result, async_trait::async_trait};

use parley_config::AuthConfig;

/// How a request was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Session token from the `token` header.
    TokenHeader,
    /// Session token from `Authorization: Bearer`.
    Bearer,
    /// Auth disabled in config.
    Anonymous,
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub uid: String,
    pub method: AuthMethod,
}

/// Maps session tokens issued by the login service to user ids.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn uid_for_token(&self, token: &str) -> Result<Option<String>>;
}

/// Effective auth policy for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAuth {
    /// Every request must carry a known token.
    Token,
    /// Every request is served as this uid.
    Disabled { anonymous_uid: String },
}

/// Resolve the auth policy from config.
pub fn resolve_auth(config: &AuthConfig) -> ResolvedAuth {
    if config.disabled {
        ResolvedAuth::Disabled {
            anonymous_uid: config.anonymous_uid.clone(),
        }
    } else {
        ResolvedAuth::Token
    }
}
