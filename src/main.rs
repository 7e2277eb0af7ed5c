//! admarket server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, the
//! background auto-approval sweep, and the optional PostgreSQL event log
//! and wallet snapshot persistence.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use admarket::api;
use admarket::app_state::AppState;
use admarket::config::MarketConfig;
use admarket::domain::{AdRegistry, CategoryCatalog, EventBus, WalletLedger};
use admarket::payment::UrlStubGateway;
use admarket::persistence::postgres::PostgresPersistence;
use admarket::service::MarketService;
use admarket::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MarketConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting admarket");

    // Build domain layer
    let registry = Arc::new(AdRegistry::new());
    let catalog = Arc::new(CategoryCatalog::new());
    let ledger = Arc::new(WalletLedger::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let gateway = Arc::new(UrlStubGateway::new(config.payment_base_url.clone()));
    let market_service = Arc::new(MarketService::new(
        registry,
        catalog,
        Arc::clone(&ledger),
        event_bus.clone(),
        gateway,
        chrono::Duration::seconds(i64::try_from(config.auto_approve_grace_secs).unwrap_or(120)),
        chrono::Duration::seconds(i64::try_from(config.rejection_window_secs).unwrap_or(3600)),
    ));

    // Background auto-approval sweep
    let sweeper = Arc::clone(&market_service);
    let sweep_interval = config.sweep_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(sweep_interval));
        loop {
            ticker.tick().await;
            let approved = sweeper.sweep_auto_approvals().await;
            if approved > 0 {
                tracing::info!(approved, "auto-approval sweep");
            }
        }
    });

    // Optional PostgreSQL event log and wallet snapshots
    if config.persistence_enabled {
        match connect_persistence(&config).await {
            Ok(persistence) => {
                if config.cleanup_after_days > 0 {
                    match persistence.delete_old_snapshots(config.cleanup_after_days).await {
                        Ok(deleted) if deleted > 0 => {
                            tracing::info!(deleted, "cleaned up old wallet snapshots");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "snapshot cleanup failed"),
                    }
                }
                restore_wallets(&persistence, &ledger).await;
                spawn_snapshot_task(
                    persistence.clone(),
                    Arc::clone(&ledger),
                    config.snapshot_interval_secs.max(1),
                );
                if config.event_log_enabled {
                    spawn_event_log(persistence, &event_bus);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "persistence unavailable, continuing without it");
            }
        }
    }

    // Build application state
    let app_state = AppState {
        market_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects the PostgreSQL pool with the configured limits.
async fn connect_persistence(
    config: &MarketConfig,
) -> Result<PostgresPersistence, Box<dyn std::error::Error>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_connect_timeout_secs,
        ))
        .connect(&config.database_url)
        .await?;
    Ok(PostgresPersistence::new(pool))
}

/// Rehydrates the ledger from the latest persisted wallet snapshots.
async fn restore_wallets(persistence: &PostgresPersistence, ledger: &Arc<WalletLedger>) {
    match persistence.load_latest_snapshots().await {
        Ok(snapshots) => {
            let mut restored = 0;
            for snapshot in snapshots {
                match serde_json::from_value(snapshot.state_json) {
                    Ok(wallet) => {
                        ledger.restore(wallet).await;
                        restored += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            wallet_id = %snapshot.wallet_id,
                            error = %e,
                            "skipping undecodable wallet snapshot"
                        );
                    }
                }
            }
            if restored > 0 {
                tracing::info!(restored, "restored wallet snapshots");
            }
        }
        Err(e) => tracing::warn!(error = %e, "snapshot load failed"),
    }
}

/// Spawns the task that periodically snapshots every wallet.
fn spawn_snapshot_task(
    persistence: PostgresPersistence,
    ledger: Arc<WalletLedger>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        // The first tick fires immediately; nothing has changed yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for wallet in ledger.snapshot_all().await {
                let state = match serde_json::to_value(&wallet) {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to serialize wallet snapshot");
                        continue;
                    }
                };
                let balance = i64::try_from(wallet.balance.cents()).unwrap_or(i64::MAX);
                if let Err(e) = persistence
                    .save_wallet_snapshot(*wallet.wallet_id.as_uuid(), balance, &state)
                    .await
                {
                    tracing::warn!(error = %e, "failed to persist wallet snapshot");
                }
            }
        }
    });
}

/// Spawns the task that appends every bus event to the database log.
fn spawn_event_log(persistence: PostgresPersistence, event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_value(&event).unwrap_or_default();
                    if let Err(e) = persistence
                        .save_event(*event.ad_id().as_uuid(), event.event_type_str(), &payload)
                        .await
                    {
                        tracing::warn!(error = %e, "failed to persist event");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event log lagged behind event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
