//! # rds-persister
//!
//! Publishes a data file so that concurrent readers never observe a partial
//! write.
//!
//! Producers fill a [`StagingSink`] obtained from [`Persister::acquire_sink`].
//! Nothing is visible at the target path until [`Persister::commit`] moves the
//! fully written staging file over the target in a single rename.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use std::io::Write;
//! use rds_persister::Persister;
//!
//! let mut persister = Persister::new("/var/lib/rds/rds/rds-data.json", None);
//! let sink = persister.acquire_sink().unwrap();
//! sink.write_all(b"{\"meta\":{},\"data\":{}}").unwrap();
//! persister.commit().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod persister;

pub use config::PersisterConfig;
pub use error::PersistError;
pub use persister::{default_staging_path, Persister, StagingSink};
