//! Portal server binary.
//!
//! Wires the workflow engine to the HTTP router. All configuration comes
//! from the environment:
//!
//! - `PORTAL_BASE_URL` - public base URL used in emailed links
//! - `PORTAL_BIND_ADDR` - listen address (default `0.0.0.0:3000`)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`, `SMTP_FROM`,
//!   `SMTP_FROM_NAME` - email delivery; without `SMTP_HOST` every email is
//!   printed to the console instead

use anyhow::Context;
use std::env;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vpn_portal::engine::WorkflowEngine;
use vpn_portal::providers::{ConsoleNotifier, Notifier, SmtpNotifier, SummaryRenderer};
use vpn_portal::stores::MemoryRequestStore;
use vpn_portal::{PortalConfig, SmtpConfig};
use vpn_portal_web::{portal_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url =
        env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let bind_addr = env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = PortalConfig::new(base_url);

    match smtp_config_from_env()? {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP delivery enabled");
            serve(SmtpNotifier::new(config, smtp), &bind_addr).await
        }
        None => {
            tracing::info!("SMTP_HOST not set; emails will print to the console");
            serve(ConsoleNotifier::new(config), &bind_addr).await
        }
    }
}

fn smtp_config_from_env() -> anyhow::Result<Option<SmtpConfig>> {
    let Ok(host) = env::var("SMTP_HOST") else {
        return Ok(None);
    };
    let port = env::var("SMTP_PORT")
        .unwrap_or_else(|_| "587".to_string())
        .parse()
        .context("SMTP_PORT must be a port number")?;
    Ok(Some(SmtpConfig {
        host,
        port,
        username: env::var("SMTP_USER").unwrap_or_default(),
        password: env::var("SMTP_PASS").unwrap_or_default(),
        from_email: env::var("SMTP_FROM").unwrap_or_else(|_| "vpn-portal@localhost".to_string()),
        from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "VPN Portal".to_string()),
    }))
}

async fn serve<N>(notifier: N, bind_addr: &str) -> anyhow::Result<()>
where
    N: Notifier + 'static,
{
    let engine = WorkflowEngine::new(
        MemoryRequestStore::new(),
        notifier,
        SummaryRenderer::new(),
    );
    let app = portal_router(AppState::new(engine)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "vpn-portal listening");
    axum::serve(listener, app).await?;
    Ok(())
}
