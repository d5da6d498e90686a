// Framework bootstrap for the party server runtime.

use crate::domain::HitResolver;
use crate::frameworks::config;
use crate::interface_adapters::clients::{HttpHitResolver, LaneResolver};
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameRegistry, SessionSettings};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Result<Arc<AppState>> {
    let resolve_timeout = config::hit_resolve_timeout();
    let resolver: Arc<dyn HitResolver> = match config::hit_resolver_url() {
        Some(base_url) => {
            let client = HttpHitResolver::new(base_url.clone(), resolve_timeout).map_err(|e| {
                std::io::Error::other(format!("failed to initialize hit-test client: {e}"))
            })?;
            tracing::debug!(
                %base_url,
                resolve_timeout_ms = resolve_timeout.as_millis(),
                "hit-test client configured"
            );
            Arc::new(client)
        }
        None => {
            tracing::debug!(lanes = config::TARGET_COUNT, "using local lane resolver");
            Arc::new(LaneResolver::new(config::TARGET_COUNT, config::LANE_HALF_WIDTH))
        }
    };

    // The registry owns every live game session and its worker task.
    let registry = Arc::new(GameRegistry::new(
        SessionSettings {
            command_capacity: config::COMMAND_CHANNEL_CAPACITY,
            broadcast_capacity: config::ACTION_BROADCAST_CAPACITY,
            target_count: config::TARGET_COUNT,
            aim_scale: config::AIM_SCALE,
            resolve_timeout,
        },
        resolver,
    ));

    Ok(Arc::new(AppState { registry }))
}
