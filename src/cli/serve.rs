//! Serve command implementation

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use nutriquest::http_server::ProgressionHttpServer;

use super::AppContext;

/// Run the HTTP API until the process is killed
pub fn serve_command(ctx: AppContext, port: Option<u16>) -> Result<()> {
    let server_settings = &ctx.config.server;
    let addr = format!(
        "{}:{}",
        server_settings.bind,
        port.unwrap_or(server_settings.port)
    );

    let server = ProgressionHttpServer::bind(&addr, ctx.config.auth_token().map(str::to_string))?;
    let service = Arc::new(ctx.service());
    info!(
        "[nq:serve] Database: {}, steps goal: {}",
        ctx.config.db_path().display(),
        ctx.config.progression.daily_steps_goal
    );

    server.spawn(service, server_settings.workers).join();
    Ok(())
}
