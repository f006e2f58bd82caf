//! # rds-fetcher
//!
//! Pulls identifier data for each configured category from the reference
//! data service and writes it as one self-describing JSON envelope:
//!
//! ```json
//! {"meta":{"format":"RdsData","version":2,"agent":"rds-downloader/0.4.0"},
//!  "data":{"foo":42,"bar":"baz"}}
//! ```
//!
//! ## Key components
//!
//! - [`CategorySet`] — the ordered category list parsed from one config value
//! - [`RefDataClient`] — the remote call, one per category, no retries
//! - [`Fetcher`] — drives the client and streams the envelope into a sink
//! - [`EnvelopeFetcher`] — the seam the scheduler depends on
//! - [`Envelope`] — read side, for consumers of the published file

pub mod category;
pub mod client;
pub mod envelope;
pub mod error;
pub mod fetcher;

pub use category::CategorySet;
pub use client::RefDataClient;
pub use envelope::{
    default_agent, fold_last_write_wins, Envelope, EnvelopeMeta, EnvelopeWriter, ENVELOPE_FORMAT,
    ENVELOPE_VERSION,
};
pub use error::{EnvelopeError, FetchError, FetchErrorKind};
pub use fetcher::{EnvelopeFetcher, Fetcher, FetcherConfig};
