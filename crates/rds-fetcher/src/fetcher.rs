// fetcher.rs — Fill a sink with one complete envelope.
//
// The fetcher walks the category list in order and calls the client once per
// entry. A category listed twice is fetched twice, but `data` carries it once:
// at its first position, with the payload of its last fetch. A failed call
// aborts immediately; whatever was already written stays in the sink and it
// is up to the caller not to publish it.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::category::CategorySet;
use crate::client::RefDataClient;
use crate::envelope::{default_agent, fold_last_write_wins, EnvelopeMeta, EnvelopeWriter};
use crate::error::FetchError;

/// Fetcher section of the downloader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Comma-separated category names, e.g. `"exchange, currency"`.
    #[serde(default)]
    pub enum_types: String,

    /// Override for `meta.agent`.
    #[serde(default)]
    pub agent: Option<String>,
}

impl FetcherConfig {
    pub fn categories(&self) -> CategorySet {
        CategorySet::parse(&self.enum_types)
    }
}

/// Anything that can fill a sink with one envelope.
///
/// [`Fetcher`] is the production implementation. The lifecycle only depends
/// on this trait, so tests can substitute fetchers that misbehave in ways the
/// real one cannot (for example writing nothing at all).
#[async_trait]
pub trait EnvelopeFetcher: Send + Sync {
    /// Write one complete envelope into `sink`, returning the entry count.
    async fn fetch_into(&self, sink: &mut (dyn Write + Send)) -> Result<usize, FetchError>;
}

/// Fetches every configured category and writes the envelope.
pub struct Fetcher {
    client: Arc<dyn RefDataClient>,
    categories: CategorySet,
    agent: String,
}

impl Fetcher {
    pub fn new(client: Arc<dyn RefDataClient>, categories: CategorySet) -> Self {
        Self {
            client,
            categories,
            agent: default_agent(),
        }
    }

    pub fn from_config(config: &FetcherConfig, client: Arc<dyn RefDataClient>) -> Self {
        let fetcher = Self::new(client, config.categories());
        match &config.agent {
            Some(agent) => fetcher.with_agent(agent.clone()),
            None => fetcher,
        }
    }

    /// Override the client identity written to `meta.agent`.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }
}

#[async_trait]
impl EnvelopeFetcher for Fetcher {
    async fn fetch_into(&self, sink: &mut (dyn Write + Send)) -> Result<usize, FetchError> {
        let meta = EnvelopeMeta::current(self.agent.clone());
        let mut writer = EnvelopeWriter::begin(sink, &meta)?;

        let mut fetched = Vec::with_capacity(self.categories.len());
        for category in self.categories.iter() {
            tracing::debug!(category, "fetching identifiers");
            let identifiers = self.client.get_identifiers(category).await?;
            fetched.push((category.to_string(), identifiers));
        }

        for (category, identifiers) in fold_last_write_wins(fetched) {
            writer.entry(&category, &identifiers)?;
        }

        let entries = writer.finish()?;
        tracing::debug!(entries, "envelope complete");
        Ok(entries)
    }
}
