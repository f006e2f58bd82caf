// run.rs — Run the download schedule until Ctrl-C.

use anyhow::Context;
use rds_lifecycle::{HealthRegistry, HealthState, StatePushFacet};

use super::{build_lifecycle, MAIN_COMPONENT};
use crate::config::DownloaderConfig;

pub async fn execute(config: &DownloaderConfig) -> anyhow::Result<()> {
    let registry = HealthRegistry::new();
    let main = registry.register(MAIN_COMPONENT);

    let mut lifecycle = build_lifecycle(config, &registry)?;
    lifecycle.start()?;
    main.set_state(HealthState::Ready);

    tracing::info!("RDS downloader running, waiting for Ctrl-C");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("Shutdown requested, waiting for in-flight download");
    lifecycle.shutdown().await;

    tracing::info!(health = %registry.overall(), "RDS downloader stopped");
    Ok(())
}
