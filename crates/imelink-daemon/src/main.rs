//! IMELink daemon entry point.
//!
//! Wires the session subsystem to a headless host: loads the TOML config,
//! initialises structured logging, registers the logging App sink, starts
//! the listener, optionally dials the configured peer, and runs until
//! Ctrl-C.
//!
//! ```text
//! main()
//!  └─ config::load_or_init()   -- config.toml, written on first run
//!  └─ SessionService::new()    -- arbiter + dispatcher
//!       ├─ start_server()      -- accept loop on the configured port
//!       └─ connect(peer)       -- only when [daemon].peer is set
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use imelink_daemon::config;
use imelink_daemon::sinks::LoggingAppSink;
use imelink_session::{AppSink, SessionService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_or_init()?;

    // Structured logging. `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.daemon.log_level.clone())),
        )
        .init();

    info!("IMELink daemon starting");

    let service = Arc::new(SessionService::new(cfg.session.clone()));
    service.register_app_sink(Some(Arc::new(LoggingAppSink) as Arc<dyn AppSink>));

    let addr = service.start_server().await?;
    info!(%addr, "IMELink daemon ready, press Ctrl-C to exit");

    // Auto-dial the paired device when one is configured. A failed dial is
    // not fatal: the listener keeps running and the peer can dial us.
    if let Some(peer) = cfg.daemon.peer.as_deref() {
        match peer.parse::<SocketAddr>() {
            Ok(peer_addr) => {
                if let Err(e) = service.connect(peer_addr).await {
                    warn!(%peer_addr, "could not reach configured peer: {e}");
                }
            }
            Err(e) => warn!(peer, "invalid peer address in config: {e}"),
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    service.shutdown().await;
    info!("IMELink daemon stopped");
    Ok(())
}
