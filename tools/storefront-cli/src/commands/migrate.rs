//! Apply database migrations.

use anyhow::Result;

use crate::context::Context;

/// Run the migrate command.
pub async fn run(ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Applying migrations...");
    let result = ctx.open_db().await;
    spinner.finish_and_clear();
    let db = result?;
    db.pool().close().await;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "database": ctx.config.database.url,
            "migrated": true,
        }));
    } else {
        ctx.output
            .success(&format!("Database up to date: {}", ctx.config.database.url));
    }

    Ok(())
}
