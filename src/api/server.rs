use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::manager::WalletManager;

pub async fn start_server(addr: &str) -> anyhow::Result<()> {
    let wallet_manager = Arc::new(WalletManager::new());

    // Configure CORS based on environment
    // Set ALLOWED_ORIGINS="https://your-app.example.com" for production
    // If not set, allows any origin (development mode)
    let cors = match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list: Vec<_> = origins
                .split(',')
                .map(|s| s.trim().parse().expect("Invalid CORS origin"))
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = Router::new()
        // Wallet routes
        .route("/api/wallet/create", post(handlers::create_wallet_handler))
        .route("/api/wallet/import", post(handlers::import_wallet_handler))
        .route("/api/wallet/list", get(handlers::list_wallets_handler))
        .route("/api/wallet/:name", delete(handlers::delete_wallet_handler))
        .route(
            "/api/wallet/:name/balance",
            get(handlers::get_balance_handler),
        )
        // Queued operations
        .route("/api/wallet/:name/payment", post(handlers::payment_handler))
        .route(
            "/api/wallet/:name/trustline",
            post(handlers::trustline_handler),
        )
        .route(
            "/api/wallet/:name/account-set",
            post(handlers::account_set_handler),
        )
        .route(
            "/api/wallet/:name/signer-list",
            post(handlers::signer_list_handler),
        )
        .route(
            "/api/wallet/:name/amm/create",
            post(handlers::amm_create_handler),
        )
        .route(
            "/api/wallet/:name/amm/deposit",
            post(handlers::amm_deposit_handler),
        )
        .route(
            "/api/wallet/:name/amm/withdraw",
            post(handlers::amm_withdraw_handler),
        )
        .route(
            "/api/wallet/:name/amm/vote",
            post(handlers::amm_vote_handler),
        )
        .route("/api/wallet/:name/mint", post(handlers::mint_handler))
        .route(
            "/api/multisign/submit",
            post(handlers::multisign_submit_handler),
        )
        // Queue introspection
        .route(
            "/api/queue",
            get(handlers::queue_snapshot_handler).delete(handlers::clear_queue_handler),
        )
        .layer(cors)
        .with_state(wallet_manager.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    // Pending queue items are in-memory only and are discarded on shutdown
    log::info!("Shutdown signal received, exiting gracefully...");
}
