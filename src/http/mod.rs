//! The HTTP surface of the ledger: routing, request tracing and the server loop.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{MatchedPath, Request},
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;

use crate::application::LedgerService;

pub mod endpoints;
mod error;
mod handlers;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{MessageResponse, TopUpRequest, TransactionView, TransferRequest};

/// The state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger service, which owns the database pool
    pub ledger: LedgerService,
}

impl AppState {
    pub fn new(ledger: LedgerService) -> Self {
        Self { ledger }
    }
}

/// Return a router with all the ledger routes and request tracing.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route(endpoints::TOP_UP, post(handlers::top_up))
        .route(endpoints::TRANSFER, post(handlers::transfer))
        .route(endpoints::TRANSACTIONS, get(handlers::recent_transactions))
        .with_state(state);

    add_tracing_layer(router)
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Server errors are logged where they are mapped to a response
        .on_failure(());

    router.layer(tracing_layer)
}

/// Serve the ledger API on `addr` until a shutdown signal arrives, then close
/// the database pool.
pub async fn serve(ledger: LedgerService, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(AppState::new(ledger.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    ledger.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for either the ctrl+c or terminate signal, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c signal."),
        _ = terminate => tracing::debug!("Received terminate signal."),
    }
}
