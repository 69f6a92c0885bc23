//! `/v1/channels/...` and `/v1/channel/state` handlers.

use std::sync::Arc;

use {
    axum::{
        Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Json, Response},
        routing::get,
    },
    parley_channels::{ChannelRecord, ChannelType, PresenceSummary},
    serde::Deserialize,
    tracing::debug,
};

use crate::{auth_middleware::AuthUser, state::GatewayState};

/// Authenticated channel routes, mounted under `/v1`.
pub fn channel_router() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/channel/state", get(channel_state_handler))
        .route(
            "/channels/{channel_id}/{channel_type}",
            get(channel_get_handler),
        )
}

/// Error response for channel handlers: `{"error": "..."}` with a status
/// derived from the failure kind. Backend detail stays in the logs.
pub struct ApiError(parley_channels::Error);

impl From<parley_channels::Error> for ApiError {
    fn from(err: parley_channels::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use parley_channels::Error;

        let status = match self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.0.public_message() })),
        )
            .into_response()
    }
}

async fn channel_get_handler(
    State(state): State<Arc<GatewayState>>,
    user: AuthUser,
    Path((channel_id, channel_type)): Path<(String, String)>,
) -> Result<Json<ChannelRecord>, ApiError> {
    let channel_type = ChannelType::parse_lenient(&channel_type);
    debug!(
        uid = user.uid(),
        auth = ?user.method(),
        channel_id = %channel_id,
        %channel_type,
        "resolving channel"
    );
    let record = state
        .resolver
        .resolve(&channel_id, channel_type, user.uid())
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StateQuery {
    channel_id: String,
    channel_type: String,
}

async fn channel_state_handler(
    State(state): State<Arc<GatewayState>>,
    user: AuthUser,
    Query(query): Query<StateQuery>,
) -> Result<Json<PresenceSummary>, ApiError> {
    let channel_type = ChannelType::parse_lenient(&query.channel_type);
    debug!(
        uid = user.uid(),
        auth = ?user.method(),
        channel_id = %query.channel_id,
        %channel_type,
        "computing channel presence"
    );
    let summary = state
        .presence
        .presence(&query.channel_id, channel_type)
        .await?;
    Ok(Json(summary))
}
