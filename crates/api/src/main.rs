use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dropstock_core::clock::{Clock, SystemClock};
use dropstock_core::user::DEMO_USERNAME;
use dropstock_db::repositories::UserRepo;
use dropstock_events::{EventBus, EventNotifier};
use dropstock_inventory::{ExpirationSweeper, InventoryConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dropstock_api::config::ServerConfig;
use dropstock_api::notifications::StockFeed;
use dropstock_api::router::build_app_router;
use dropstock_api::state::AppState;
use dropstock_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dropstock_api=debug,dropstock_inventory=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let inventory_config = InventoryConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        hold_secs = inventory_config.hold_duration.num_seconds(),
        sweep_interval_secs = inventory_config.sweep_interval.as_secs(),
        "Loaded configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = dropstock_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    dropstock_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    dropstock_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let demo_user = UserRepo::find_or_create(&pool, DEMO_USERNAME)
        .await
        .expect("Failed to seed demo user");
    tracing::info!(user_id = demo_user.id, username = %demo_user.username, "Demo user ready");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // Spawn the stock feed (pushes inventory events to every socket).
    let feed_cancel = CancellationToken::new();
    let feed_handle = tokio::spawn(
        StockFeed::new(Arc::clone(&ws_manager)).run(event_bus.subscribe(), feed_cancel.clone()),
    );

    // --- Expiration sweeper ---
    let notifier: Arc<dyn EventNotifier> = event_bus.clone();
    let sweeper = ExpirationSweeper::new(
        pool.clone(),
        notifier,
        Arc::clone(&clock),
        inventory_config.sweep_interval,
    )
    .spawn();

    // --- App state ---
    let config = Arc::new(config);
    let state = AppState::new(
        pool,
        Arc::clone(&config),
        &inventory_config,
        clock,
        Arc::clone(&ws_manager),
        Arc::clone(&event_bus),
    );

    let app = build_app_router(state, &config);

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
    let wait = Duration::from_secs(config.shutdown_timeout_secs);

    // Stop the sweeper first; an in-flight sweep commits or rolls back.
    if sweeper.shutdown(wait).await {
        tracing::info!("Expiration sweeper stopped");
    } else {
        tracing::warn!("Expiration sweeper did not stop in time");
    }

    feed_cancel.cancel();
    let _ = tokio::time::timeout(wait, feed_handle).await;
    drop(event_bus);
    tracing::info!("Stock feed stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM to initiate graceful shutdown.
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
