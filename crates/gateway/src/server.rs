use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use {
    axum::{
        Router,
        extract::State,
        response::{IntoResponse, Json},
        routing::get,
    },
    parley_channels::{ChannelResolver, PresenceAggregator},
    parley_config::ParleyConfig,
    sqlx::SqlitePool,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
};

use crate::{
    auth::resolve_auth, channel_routes::channel_router,
    channel_setting_store::SqliteChannelSettingStore, directory_store::SqliteDirectory,
    modules::default_registry, state::GatewayState,
};

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", channel_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the database, create tables, and wire the SQLite-backed collaborators
/// into a [`GatewayState`].
pub async fn build_gateway_state(
    config: &ParleyConfig,
    pool: SqlitePool,
) -> anyhow::Result<Arc<GatewayState>> {
    SqliteDirectory::init(&pool).await?;
    SqliteChannelSettingStore::init(&pool).await?;

    let directory = Arc::new(SqliteDirectory::new(pool.clone()));
    let settings = Arc::new(SqliteChannelSettingStore::new(pool));

    let registry = default_registry(directory.clone(), directory.clone())?;
    info!(modules = ?registry.list(), "module registry ready");

    let resolver = ChannelResolver::new(Arc::new(registry), settings);
    let presence = PresenceAggregator::new(directory.clone(), directory.clone());
    Ok(GatewayState::new(
        resolver,
        presence,
        directory,
        resolve_auth(&config.auth),
    ))
}

/// Start the gateway HTTP server and run until ctrl-c.
pub async fn start_gateway(
    config: ParleyConfig,
    bind: &str,
    port: u16,
    data_dir: PathBuf,
) -> anyhow::Result<()> {
    let db_path = config.database.resolve_path(&data_dir);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let pool = SqlitePool::connect(&db_url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", db_path.display()))?;

    let state = build_gateway_state(&config, pool).await?;
    if matches!(state.auth, crate::auth::ResolvedAuth::Disabled { .. }) {
        tracing::warn!("authentication is disabled; every request is anonymous");
    }
    let app = build_gateway_app(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        db = %db_path.display(),
        version = env!("CARGO_PKG_VERSION"),
        "parley gateway listening"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("parley gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
        "modules": state.resolver.registry().list(),
    }))
}
