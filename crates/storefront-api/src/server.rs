//! Server bootstrap.

use std::sync::Arc;

use salvo::prelude::*;
use tracing::{error, info};

use crate::{router::app_router, shutdown, ApiError, AppState, ServerConfig};

/// Serve the API until Ctrl+C or SIGTERM.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ApiError> {
    let addr = config.bind_addr();

    let acceptor = TcpListener::new(addr.clone())
        .try_bind()
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            message: source.to_string(),
        })?;

    info!("Starting server on {addr}");

    let server = Server::new(acceptor);
    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(app_router(state)).await;

    info!("server stopped");
    Ok(())
}
