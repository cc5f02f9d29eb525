//! # Edge Broker
//!
//! Entry point for one broker replica.
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry (logging + metrics)
//! 2. Load configuration (defaults + `EB_*` environment)
//! 3. Build subsystems and start the registry consume loop
//! 4. Serve HTTP/WebSocket until Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use broker_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{load_config, BrokerRuntime};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialise telemetry")?;

    info!("===========================================");
    info!("  Edge Broker v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config();
    let mut runtime = BrokerRuntime::new(config).context("Invalid configuration")?;
    runtime
        .start()
        .context("Failed to start registry synchronisation")?;

    let gateway = runtime.gateway().context("Failed to build API gateway")?;
    let mut server = tokio::spawn(gateway.serve(runtime.shutdown_signal()));

    info!("Broker is running. Press Ctrl+C to stop.");
    tokio::select! {
        result = &mut server => {
            // The server only returns early on failure.
            runtime.shutdown().await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e).context("API gateway stopped"),
                Err(e) => Err(e).context("API gateway task failed"),
            };
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
        }
    }

    runtime.shutdown().await;
    server
        .await
        .context("API gateway task failed")?
        .context("API gateway stopped")?;

    Ok(())
}
