// once.rs — Run a single download cycle and report its outcome.

use rds_lifecycle::HealthRegistry;

use super::build_lifecycle;
use crate::config::DownloaderConfig;

/// Fails unless the cycle ended READY, so the exit code is usable from cron.
pub async fn execute(config: &DownloaderConfig) -> anyhow::Result<()> {
    let registry = HealthRegistry::new();
    let lifecycle = build_lifecycle(config, &registry)?;

    let state = lifecycle.run_once().await;
    println!("{}", state);

    if !state.is_ready() {
        anyhow::bail!("Download cycle did not complete");
    }
    Ok(())
}
