// mod.rs — Subcommands and the wiring they share.

pub mod once;
pub mod run;
pub mod show;

use std::sync::Arc;

use anyhow::Context;
use rds_fetcher::Fetcher;
use rds_lifecycle::{HealthRegistry, Lifecycle, TokioClock, COMPONENT_NAME};

use crate::client::HttpRefDataClient;
use crate::config::DownloaderConfig;

/// Health component for the application itself.
pub const MAIN_COMPONENT: &str = "main";

/// Build a stopped lifecycle from `config`, reporting into `registry`.
pub fn build_lifecycle(
    config: &DownloaderConfig,
    registry: &Arc<HealthRegistry>,
) -> anyhow::Result<Lifecycle> {
    config.validate()?;

    let client = HttpRefDataClient::new(&config.client)?;
    let endpoint = client.endpoint().to_string();
    let fetcher = Fetcher::from_config(&config.fetcher, Arc::new(client));
    if fetcher.categories().is_empty() {
        tracing::warn!("No enum types configured; published data will be empty");
    }

    let persister = config.persister.build(&config.data_root);
    tracing::info!(
        endpoint = %endpoint,
        categories = %fetcher.categories(),
        target_path = %persister.target().display(),
        staging = %persister.staging().display(),
        "RDS downloader configured"
    );

    let lifecycle = Lifecycle::new(
        &config.lifecycle,
        Arc::new(fetcher),
        persister,
        registry.register(COMPONENT_NAME),
        Arc::new(TokioClock),
    )
    .context("invalid [lifecycle] settings")?;
    Ok(lifecycle)
}
