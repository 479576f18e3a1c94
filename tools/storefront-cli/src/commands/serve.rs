//! Run the HTTP API.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use storefront_api::{serve, AppState};
use storefront_auth::LogMailer;
use storefront_db::Db;
use storefront_observability::init_logging;
use tracing::info;

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    init_logging(&ctx.config.logging).context("Failed to initialize logging")?;

    let mut server = ctx.config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let pricing = ctx.config.pricing.policy().context("Invalid pricing config")?;

    let db = if args.no_migrate {
        Db::connect(&ctx.config.database)
            .await
            .with_context(|| format!("Failed to open database {}", ctx.config.database.url))?
    } else {
        ctx.open_db().await?
    };

    let state = AppState::new(db, pricing, Arc::new(LogMailer), server.frontend_url.clone());

    info!(
        addr = %server.bind_addr(),
        environment = ctx.environment.as_deref().unwrap_or("default"),
        "starting storefront"
    );
    serve(&server, state.shared()).await?;
    info!("storefront stopped");

    Ok(())
}
