//! Wiring & DI. Entry point: bootstrap the gateway, open the workspace session, run UI.
//! No business logic here; the workflow lives in WorkflowSession.

use dotenv::dotenv;
use drama_studio::adapters::backend::{HttpBackendGateway, MockBackendGateway};
use drama_studio::adapters::ui::tui::TuiInputPort;
use drama_studio::ports::{BackendGateway, InputPort};
use drama_studio::shared::config::AppConfig;
use drama_studio::usecases::WorkflowSession;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated latency of the offline backend.
const OFFLINE_DELAY_MS: u64 = 600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    // stderr + default "warn" keeps log lines out of the chat transcript
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    drama_studio::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });
    let session_id = cfg.session_id_or_default();

    // --- Gateway: HTTP backend, or the built-in mock when offline ---
    let gateway: Arc<dyn BackendGateway> = if cfg.is_offline() {
        info!(session_id = %session_id, "offline mode: using mock backend");
        Arc::new(MockBackendGateway::with_delay(session_id, OFFLINE_DELAY_MS))
    } else {
        let base_url = cfg.api_base_url_or_default();
        info!(base_url = %base_url, session_id = %session_id, "using HTTP backend");
        Arc::new(
            HttpBackendGateway::new(base_url, session_id, cfg.request_timeout())
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    };

    // --- Workspace session: health probe, then the optional opening prompt ---
    let mut session = WorkflowSession::new(gateway, cfg.artifact_delay());
    if !session.check_backend().await {
        warn!("backend is not reachable; messages will be refused until it is up");
    } else if let Some(message) = cfg.initial_message() {
        if let Err(e) = session.send_message(message).await {
            warn!(error = %e, "initial message was not sent");
        }
    }

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(session, cfg.editing_plan()));

    // --- Run (chat loop until /quit or Ctrl-C) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
