use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nuhire_api::config::ServerConfig;
use nuhire_api::realtime::RealtimeRouter;
use nuhire_api::router::build_app_router;
use nuhire_api::state::AppState;
use nuhire_api::{background, ws};

/// How long the event subscribers get to drain once the bus closes.
const EVENT_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nuhire_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = nuhire_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    nuhire_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    nuhire_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- WebSocket manager and heartbeat ---
    let cancel = CancellationToken::new();
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), cancel.clone());

    // --- Event bus ---
    let event_bus = Arc::new(nuhire_events::EventBus::default());

    let persistence_handle = tokio::spawn(nuhire_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    let realtime_router = RealtimeRouter::new(Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(realtime_router.run(event_bus.subscribe()));

    // --- Background jobs ---
    let cleanup_handle = tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        Duration::from_secs(config.session_cleanup_interval_secs),
        Duration::from_secs(config.session_retention_hours * 3600),
        cancel.clone(),
    ));
    tracing::info!("Background services started (persistence, realtime router, session cleanup)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    let _ = tokio::time::timeout(drain, cleanup_handle).await;
    let _ = tokio::time::timeout(drain, heartbeat_handle).await;

    // Open sockets hold `AppState` clones, and with them the bus sender.
    // Close them first so dropping ours actually closes the bus.
    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    // Both subscribers exit once the last sender is gone.
    drop(event_bus);
    let _ = tokio::time::timeout(EVENT_DRAIN, persistence_handle).await;
    let _ = tokio::time::timeout(EVENT_DRAIN, router_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
